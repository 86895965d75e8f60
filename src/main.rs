//! Chouette · French Quiz Backend
//!
//! - Axum HTTP + WebSocket API
//! - Answer evaluation + Ebbinghaus review scheduling
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   DATA_PATH         : JSON data file (default "./chouette_data.json")
//!   BANK_CONFIG_PATH  : path to TOML question bank, merged over the seeds
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod config;
mod domain;
mod evaluator;
mod logic;
mod protocol;
mod routes;
mod scheduler;
mod seeds;
mod state;
mod store;
mod telemetry;
mod textmatch;
mod util;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (question bank + persisted data file).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "chouette_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
