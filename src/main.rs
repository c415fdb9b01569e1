use actix_web::{App, HttpServer};
use fib_bench::api::api_functions::AppState;
use fib_bench::config::load_config;
use log::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let core_ids = core_affinity::get_core_ids().unwrap_or_default();
    let config = load_config().clamp_workers(core_ids.len());
    info!("Loaded config: {config:?}");

    let bind_address = config.bind_address.clone();
    let state = AppState::new(config, core_ids);

    info!("Server started on {bind_address}");
    HttpServer::new(move || {
        let state = state.clone();
        App::new().configure(move |cfg| state.configure(cfg))
    })
    .bind(&bind_address)?
    .run()
    .await?;
    Ok(())
}
