//! Graceful shutdown handling
//!
//! One [`CancellationToken`] is shared by every long-running task. It is
//! cancelled by Ctrl+C, by SIGTERM, or by the first task that fails.

use std::future::Future;
use std::sync::{Arc, OnceLock};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Tracks the long-running tasks of the process. The first task to exit,
/// cleanly or not, cancels the shared token.
#[derive(Clone, Default)]
pub struct Supervisor {
    token: CancellationToken,
    failure: Arc<OnceLock<String>>,
}

impl Supervisor {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            failure: Arc::default(),
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wrap a task so that its exit triggers shutdown. Spawn the result.
    pub fn watch<F>(&self, name: &'static str, future: F) -> impl Future<Output = ()> + use<F>
    where
        F: Future<Output = anyhow::Result<()>>,
    {
        let token = self.token.clone();
        let failure = self.failure.clone();
        async move {
            match future.await {
                Ok(()) if token.is_cancelled() => info!("{} stopped", name),
                Ok(()) => warn!("{} exited unexpectedly", name),
                Err(e) => {
                    error!("{} failed: {:#}", name, e);
                    let _ = failure.set(format!("{}: {:#}", name, e));
                }
            }
            token.cancel();
        }
    }

    /// First task failure, if any
    pub fn failure(&self) -> Option<&str> {
        self.failure.get().map(String::as_str)
    }
}

/// Cancel `token` on Ctrl+C or SIGTERM
pub fn spawn_signal_listener(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C, initiating graceful shutdown...");
            }
            _ = terminate => {
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
            _ = token.cancelled() => return,
        }

        token.cancel();
    })
}

/// Run a future until it completes or the token is cancelled
pub async fn run_with_shutdown<F, T>(future: F, token: &CancellationToken) -> Option<T>
where
    F: Future<Output = T>,
{
    tokio::select! {
        result = future => Some(result),
        _ = token.cancelled() => {
            warn!("Shutdown signal received, cancelling operation");
            None
        }
    }
}

/// Await a shutdown step, giving up at `deadline`. Every step of one
/// shutdown shares the same deadline. Returns whether the step finished in
/// time.
pub async fn drain<F>(name: &str, future: F, deadline: Instant) -> bool
where
    F: Future<Output = ()>,
{
    match tokio::time::timeout_at(deadline, future).await {
        Ok(()) => {
            info!("{} stopped", name);
            true
        }
        Err(_) => {
            warn!("{} did not stop before the shutdown deadline", name);
            false
        }
    }
}
