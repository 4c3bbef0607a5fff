//! Webroot Linker - Entry Point
//!
//! Local admin service that links project folders into a web server's
//! document root and browses the files behind them.

use log::{error, info};

use webroot_linker::{AppConfig, Server};

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Launching webroot linker...");

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
