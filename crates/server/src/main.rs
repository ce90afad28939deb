// crates/server/src/main.rs
//! Simdeck server binary.
//!
//! Binds the HTTP bridge immediately; simulation jobs are started on demand
//! by the front-end and run as background tasks.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use simdeck_core::{Exporter, PhaseOneEngine};
use simdeck_server::{create_app, AppState};

/// Default port for the server.
const DEFAULT_PORT: u16 = 47311;

/// Get the server port from environment or use default.
fn get_port() -> u16 {
    std::env::var("SIMDECK_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Resolve the export directory.
///
/// Priority:
/// 1. SIMDECK_EXPORT_DIR environment variable (explicit override)
/// 2. ~/.simdeck/exports
fn get_export_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SIMDECK_EXPORT_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home.join(".simdeck").join("exports"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (quiet — startup UX uses eprintln)
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Print banner
    eprintln!("\n\u{269b} simdeck v{}\n", env!("CARGO_PKG_VERSION"));

    let export_dir = get_export_dir()?;
    let engine = Arc::new(PhaseOneEngine::new());
    let state = AppState::new(engine, Exporter::new(&export_dir));
    let app = create_app(state);

    let port = get_port();
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    eprintln!("  \u{2713} Ready \u{2014} exports in {}", export_dir.display());
    eprintln!("  \u{2192} http://localhost:{}\n", port);

    axum::serve(listener, app).await?;

    Ok(())
}
