use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use lca_auth::config::ServerConfig;
use lca_auth::handlers::{self, AppContext};
use lca_auth::mail::SmtpMailer;
use lca_auth::storage::SupabaseStore;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Initialize env
    match dotenvy::dotenv() {
        Ok(_) => info!("Environment variables loaded from .env file"),
        Err(e) => warn!("Failed to load .env file: {}", e),
    };

    // Load config from the environment
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration: host={}, port={}", config.host, config.port);

    // External collaborators: hosted datastore and SMTP relay
    let store = match SupabaseStore::new(&config) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Failed to initialize datastore client: {}", e);
            std::process::exit(1);
        }
    };

    let mailer = match SmtpMailer::new(&config) {
        Ok(mailer) => Arc::new(mailer),
        Err(e) => {
            error!("Failed to initialize mailer: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = AppContext::new(&config, store, mailer);

    // CORS: single allowed frontend origin, credentials enabled
    let cors = warp::cors()
        .allow_origin(config.cors_origin.as_str())
        .allow_credentials(true)
        .allow_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allow_headers(vec!["content-type", "authorization"]);

    let routes = handlers::routes(ctx)
        .recover(handlers::handle_rejection)
        .with(cors);

    // Build the server address
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to parse server address: {}", e);
            std::process::exit(1);
        }
    };

    // Start the server
    info!("Starting LCA auth server on {}", addr);

    warp::serve(routes).run(addr).await;
}
