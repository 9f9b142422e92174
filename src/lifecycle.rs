//! Actor supervision for the process lifetime
//!
//! A [`Group`] runs a set of independent long-running actors concurrently and
//! enforces an "any one exits, all stop" discipline: the first actor to
//! return (cleanly or not) produces the triggering result, every actor's
//! interrupt is invoked with it, and [`Group::run`] returns the triggering
//! result once every actor has finished.
//!
//! The module also provides the three concrete actors the application wires
//! together: the HTTP server, the OS-signal watcher, and a watcher that links
//! an external [`CancellationToken`] into the group.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{OutpostError, Result};

/// Ceiling on the graceful drain of in-flight HTTP requests during shutdown.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

type StartFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;
type InterruptFn = Box<dyn FnOnce(Option<&OutpostError>) + Send>;

/// An ordered collection of actors run as a unit.
///
/// Exclusive registration is enforced by `add` taking `&mut self`, and `run`
/// consumes the group, so a group cannot be run twice or mutated while
/// running.
#[derive(Default)]
pub struct Group {
    starts: Vec<StartFuture>,
    interrupts: Vec<InterruptFn>,
}

impl Group {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an actor.
    ///
    /// `start` is the actor's blocking work; `interrupt` is invoked with the
    /// triggering actor's error (`None` for a clean first exit) once any
    /// actor has returned, and must cause `start` to return in bounded time.
    pub fn add<S, I>(&mut self, start: S, interrupt: I)
    where
        S: Future<Output = Result<()>> + Send + 'static,
        I: FnOnce(Option<&OutpostError>) + Send + 'static,
    {
        self.starts.push(Box::pin(start));
        self.interrupts.push(Box::new(interrupt));
    }

    /// Run every registered actor concurrently and block until quiescence.
    ///
    /// Returns the result of whichever actor finished first. With no actors
    /// registered this returns `Ok(())` immediately.
    ///
    /// Contract: every interrupt must make its paired start return within a
    /// bounded time; an actor that ignores its interrupt keeps `run` from
    /// terminating.
    pub async fn run(self) -> Result<()> {
        if self.starts.is_empty() {
            return Ok(());
        }

        let mut tasks = JoinSet::new();
        for start in self.starts {
            tasks.spawn(start);
        }

        let trigger = match tasks.join_next().await {
            Some(Ok(result)) => result,
            Some(Err(join_error)) => Err(OutpostError::Generic(format!(
                "actor task failed: {join_error}"
            ))),
            None => return Ok(()),
        };

        for interrupt in self.interrupts {
            interrupt(trigger.as_ref().err());
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(join_error) = joined {
                warn!("actor task failed during shutdown: {join_error}");
            }
        }

        trigger
    }
}

/// Actor serving an axum router on an already-bound listener.
///
/// The start future drains in-flight requests once `shutdown` is cancelled,
/// force-returning after [`SHUTDOWN_GRACE`]; the interrupt cancels the token.
pub fn http_server(
    listener: TcpListener,
    router: axum::Router,
    shutdown: CancellationToken,
) -> (
    impl Future<Output = Result<()>> + Send,
    impl FnOnce(Option<&OutpostError>) + Send,
) {
    let token = shutdown.clone();
    let start = async move {
        let serve = axum::serve(listener, router)
            .with_graceful_shutdown(token.clone().cancelled_owned())
            .into_future();
        tokio::select! {
            served = serve => served.map_err(OutpostError::from),
            () = async {
                token.cancelled().await;
                tokio::time::sleep(SHUTDOWN_GRACE).await;
            } => {
                warn!("shutdown grace period elapsed, dropping in-flight requests");
                Ok(())
            }
        }
    };
    let interrupt = move |_: Option<&OutpostError>| shutdown.cancel();
    (start, interrupt)
}

/// Actor resolving on SIGINT/SIGTERM, cancelling `cancel` on the way out.
pub fn signals(
    cancel: CancellationToken,
) -> (
    impl Future<Output = Result<()>> + Send,
    impl FnOnce(Option<&OutpostError>) + Send,
) {
    let token = cancel.clone();
    let start = async move {
        wait_for_signal(&token).await?;
        token.cancel();
        Ok(())
    };
    let interrupt = move |_: Option<&OutpostError>| cancel.cancel();
    (start, interrupt)
}

#[cfg(unix)]
async fn wait_for_signal(cancel: &CancellationToken) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("received SIGINT"),
        _ = terminate.recv() => info!("received SIGTERM"),
        () = cancel.cancelled() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal(cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("received ctrl-c"),
        () = cancel.cancelled() => {}
    }
    Ok(())
}

/// Actor that links an external cancellation token into the group: its start
/// returns when the token is cancelled, and its interrupt cancels the token.
pub fn cancel_watcher(
    token: CancellationToken,
) -> (
    impl Future<Output = Result<()>> + Send,
    impl FnOnce(Option<&OutpostError>) + Send,
) {
    let watched = token.clone();
    let start = async move {
        watched.cancelled().await;
        Ok(())
    };
    let interrupt = move |_: Option<&OutpostError>| token.cancel();
    (start, interrupt)
}
