use actix_web::{middleware, web, App, HttpServer};
use jee_prep_tracker::{configure, AppState, Config};
use std::error::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn start_api(state: AppState) -> std::io::Result<()> {
    let bind = (state.config.host.clone(), state.config.port);
    let state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    info!(
        host = %config.host,
        port = config.port,
        demo_mode = config.demo_mode(),
        seed = config.seed_demo_data,
        "loading JEE Prep Tracker"
    );

    let state = AppState::new(config)?;
    if state.config.seed_demo_data {
        info!("demo accounts ready: student@jeeprep.dev, parent@jeeprep.dev, admin@jeeprep.dev");
    }
    if !state.assistant.enabled() {
        info!("no assistant key configured, AI endpoints will serve fallback text");
    }

    info!(
        "starting API on http://{}:{}",
        state.config.host, state.config.port
    );
    start_api(state).await?;
    Ok(())
}
