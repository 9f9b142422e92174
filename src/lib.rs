//! # Outpost
//!
//! Outpost is a minimal local web dashboard over a directory tree of
//! generated files. Top-level subdirectories of the output root are
//! "namespaces"; the index page lists each one with its recursive file count
//! and latest modification time.
//!
//! The process is supervised by a generic lifecycle [`lifecycle::Group`]
//! running three concurrent actors — the HTTP server, an OS-signal watcher,
//! and a cancellation watcher — with an "any one exits, all stop" discipline.
//!
//! ## Getting Started
//!
//! ```no_run
//! use std::path::PathBuf;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), outpost::error::OutpostError> {
//!     let cancel_token = CancellationToken::new();
//!     outpost::server::run(3333, PathBuf::from("out"), cancel_token).await
//! }
//! ```

/// Custom error types module
///
/// Defines the `OutpostError` enum and the crate-local `Result` alias used
/// for consistent error handling across the application.
pub mod error;

/// Dotenv-style configuration loading
///
/// Parses `.env` files into a key/value mapping, applies variable expansion
/// and precedence rules, seeds the process environment, and exposes typed
/// accessors over it.
pub mod env;

/// Lifecycle supervision module
///
/// The actor `Group` primitive plus the concrete actors (HTTP server, signal
/// watcher, cancellation watcher) that the application runs as a unit.
pub mod lifecycle;

/// Output directory scanning
///
/// Walks the generated-output root and summarizes each namespace by file
/// count and latest modification time.
pub mod store;

/// JSON response helpers
///
/// The uniform `{status, message, data}` envelope and its status helpers.
pub mod response;

/// Health check endpoint
pub mod health;

/// Index page rendering
pub mod index;

/// Server operations module
///
/// Assembles the axum router, binds the listener, and wires the lifecycle
/// actors together.
pub mod server;
