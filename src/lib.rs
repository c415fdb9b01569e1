//! Six Fibonacci strategies and a core-pinned benchmark server that times them.

pub mod api;
pub mod config;
pub mod evaluation_metrics;
pub mod fibonacci;
pub mod memory_monitoring;
pub mod scheduler;
pub mod worker;

pub use fibonacci::{FibError, Strategy, MAX_N};
