//! Graceful shutdown.
//!
//! There is one cancellation signal per process. [`Shutdown`] is the only
//! handle that can trigger it; every job and periodic task gets a read-only
//! [`ShutdownSignal`] and returns as soon as it observes the cancellation.
//!
//! `SIGINT` (Ctrl+C) and `SIGTERM` trigger the signal. Only the first trigger
//! counts, later ones are ignored.
use std::future::Future;
use std::sync::{Arc, OnceLock};

use derive_more::Display;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Why the seeder is stopping.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Reason {
    /// `SIGINT` or Ctrl+C.
    #[display("interrupt signal")]
    Interrupted,
    /// `SIGTERM`.
    #[display("terminate signal")]
    Terminated,
    /// Requested from code, for example by a test.
    #[display("shutdown requested")]
    Requested,
}

/// The writer side of the cancellation signal.
#[derive(Clone, Debug, Default)]
pub struct Shutdown {
    token: CancellationToken,
    reason: Arc<OnceLock<Reason>>,
}

impl Shutdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels every task. It returns `false` if the shutdown had already
    /// been triggered.
    pub fn trigger(&self, reason: Reason) -> bool {
        if self.reason.set(reason).is_err() {
            return false;
        }

        self.token.cancel();

        true
    }

    /// The reason of the first trigger.
    #[must_use]
    pub fn reason(&self) -> Option<Reason> {
        self.reason.get().copied()
    }

    /// A read-only view for the tasks.
    #[must_use]
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            token: self.token.clone(),
        }
    }

    /// Resolves once the shutdown has been triggered.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }

    /// Spawns a task that triggers the shutdown on the first `SIGINT` or
    /// `SIGTERM`. The task ends when the shutdown is triggered by any means.
    #[must_use]
    pub fn listen_for_os_signals(&self) -> JoinHandle<()> {
        let shutdown = self.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;

                () = shutdown.wait() => {}
                reason = global_shutdown_signal() => {
                    if shutdown.trigger(reason) {
                        tracing::info!(%reason, "Received shutdown signal...");
                    }
                }
            }
        })
    }
}

/// The reader side of the cancellation signal.
#[derive(Clone, Debug)]
pub struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the shutdown has been triggered.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Runs `future` unless the shutdown comes first. The shutdown wins when
    /// both are ready.
    pub async fn until_cancelled<F: Future>(&self, future: F) -> Option<F::Output> {
        tokio::select! {
            biased;

            () = self.cancelled() => None,
            output = future => Some(output),
        }
    }
}

/// Resolves on `ctrl_c` or the `terminate` signal.
///
/// # Panics
///
/// Will panic if the `ctrl_c` or `terminate` signal resolves with an error.
pub async fn global_shutdown_signal() -> Reason {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => Reason::Interrupted,
        () = terminate => Reason::Terminated,
    }
}
