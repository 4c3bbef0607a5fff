use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use log::{error, info, warn};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::error::ServerError;
use crate::protocol::{handle_request, parse_request};
use crate::server::AppState;

pub struct Server {
    listener: TcpListener,
    state: AppState,
}

impl Server {
    /// Binds the listener and builds the host-system state
    pub async fn new(config: AppConfig) -> Result<Self, ServerError> {
        Self::with_state(AppState::from_config(config)).await
    }

    pub async fn with_state(state: AppState) -> Result<Self, ServerError> {
        let addr = state.config.listen_socket();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        info!("Server bound to {}", addr);

        let web_root = state.links.web_root();
        if let Err(e) = std::fs::create_dir_all(web_root) {
            warn!("Failed to create web root directory: {}", e);
        } else {
            info!("Web root directory: {}", web_root.display());
        }

        Ok(Self { listener, state })
    }

    pub async fn start(self) -> Result<(), ServerError> {
        info!(
            "Starting webroot linker on http://{}",
            self.state.config.listen_socket()
        );
        axum::serve(self.listener, router(self.state)).await?;
        Ok(())
    }
}

/// Routes of the admin API
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api", post(api))
        .route("/health", get(health))
        .with_state(state)
}

async fn api(State(state): State<AppState>, body: String) -> (StatusCode, Json<Value>) {
    match parse_request(&body) {
        Ok(request) => (StatusCode::OK, Json(handle_request(&state, request).await)),
        Err(e) => {
            error!("Rejected request: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": format!("Invalid request: {}", e) })),
            )
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
