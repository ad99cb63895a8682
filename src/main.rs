use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use yatube::routes::build_app;
use yatube::seed::populate_sample_data;
use yatube::{AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environments set variables directly
    dotenvy::dotenv().ok();

    // Initialize tracing for logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "yatube=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Yatube server...");

    // Load configuration from environment
    let config = AppConfig::from_env();
    if config.session_secret == AppConfig::default().session_secret {
        warn!("SESSION_SECRET not set, using the development secret");
    }

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;
    info!(storage = app_state.db.backend_name(), "application state initialized");

    if config.seed_sample_data {
        populate_sample_data(&app_state).await?;
    }

    let app = build_app(app_state);

    let listener = TcpListener::bind(config.server_address()).await?;
    info!("Server running on http://{}", config.server_address());

    axum::serve(listener, app).await?;

    Ok(())
}
