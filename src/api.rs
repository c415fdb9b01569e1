pub mod api_functions;
pub mod api_handlers;
pub mod api_objects;
