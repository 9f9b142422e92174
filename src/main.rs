//! # Outpost Main Application Entry Point
//!
//! Loads environment configuration, prepares the output directory, and runs
//! the web server under lifecycle supervision until a signal arrives or an
//! actor exits.
//!
//! Configuration comes from `.env`/`.env.local` and the ambient environment:
//!
//! - `OUTPOST_PORT`: port to listen on (default 3333)
//! - `OUTPOST_OUT_DIR`: output root holding the namespace directories
//!   (default `out`)
//!
//! Log levels are controlled through the `RUST_LOG` environment variable.

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use outpost::error::Result;
use outpost::{env, server, store};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    env::load_default(&env::Options {
        overwrite: false,
        expand: true,
    })?;

    let port = u16::try_from(env::int("OUTPOST_PORT", 3333)).unwrap_or(3333);
    let out_dir = env::string("OUTPOST_OUT_DIR", "out");

    store::ensure_out(&out_dir)?;

    tracing::info!(
        "Starting outpost on http://localhost:{port} (pid {})",
        std::process::id()
    );

    let cancel_token = CancellationToken::new();
    if let Err(e) = server::run(port, out_dir.into(), cancel_token).await {
        tracing::error!("exit: {e}");
        return Err(e);
    }

    tracing::info!("Outpost shut down cleanly");
    Ok(())
}
