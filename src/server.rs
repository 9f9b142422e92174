//! Web server assembly and lifecycle wiring

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::Result;
use crate::lifecycle::{self, Group};
use crate::{health, index};

/// State shared by request handlers.
pub struct AppState {
    /// Root of the generated output tree.
    pub out_dir: PathBuf,
}

/// Authentication middleware.
///
/// Currently a stub that authenticates every request; the dashboard is meant
/// for local use. Kept in the middleware chain so credential checks have an
/// obvious place to land.
async fn authenticate(request: Request, next: Next) -> Response {
    next.run(request).await
}

/// Build the application router.
///
/// Routes: the namespace index at `/`, the health probe at `/health`, static
/// assets under `/static`, and a raw passthrough of the output directory
/// under `/out` for debugging.
pub fn router(out_dir: PathBuf) -> Router {
    let state = Arc::new(AppState {
        out_dir: out_dir.clone(),
    });

    Router::new()
        .route("/", get(index::index))
        .route("/health", get(health::health))
        .nest_service("/static", ServeDir::new("static"))
        .nest_service("/out", ServeDir::new(out_dir))
        .layer(middleware::from_fn(authenticate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the web server on the specified port until any lifecycle actor exits.
///
/// Registers three actors with a [`Group`]: the OS-signal watcher, the HTTP
/// server, and a watcher linking `cancel_token` into the group so callers can
/// trigger shutdown programmatically. Returns the triggering actor's result;
/// a graceful shutdown is `Ok`.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or if the triggering
/// actor exited with an error.
pub async fn run(port: u16, out_dir: PathBuf, cancel_token: CancellationToken) -> Result<()> {
    tracing::info!("Initializing server");

    let app = router(out_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    let mut group = Group::new();

    let (start, interrupt) = lifecycle::signals(cancel_token.clone());
    group.add(start, interrupt);

    let (start, interrupt) = lifecycle::http_server(listener, app, cancel_token.clone());
    group.add(start, interrupt);

    let (start, interrupt) = lifecycle::cancel_watcher(cancel_token);
    group.add(start, interrupt);

    let result = group.run().await;
    tracing::info!("Server shutdown complete");
    result
}
