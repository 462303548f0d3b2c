use anyhow::Result;
use dotenv::dotenv;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use yd_advisory::config::AppConfig;
use yd_advisory::routes;
use yd_advisory::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();
    dotenv().ok();
    info!("Logger initialized. Starting the application...");

    let config = AppConfig::from_env()?;
    info!("Using PORT: {}", config.port);
    info!("Calculator input mode: {:?}", config.input_mode);

    // Bind to 0.0.0.0 for Heroku
    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Will bind to: {}", addr);

    let state = Arc::new(AppState::from_config(config));
    info!(
        "Lead transports: {}",
        state.notifier.transport_names().join(" -> ")
    );

    // Set up CORS
    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"]);

    // Set up routes
    let api = routes::routes(state).with(cors).with(warp::log("yd_advisory::api"));
    info!("Routes configured successfully with CORS.");

    // Start the server
    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
    Ok(())
}
