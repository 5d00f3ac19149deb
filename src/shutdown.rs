use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::signal;

/// Abort flag tripped by Ctrl+C or SIGTERM and polled by the planner at
/// each turn boundary.
#[derive(Clone, Default)]
pub struct AbortSignal {
    aborted: Arc<AtomicBool>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Install signal handlers that trip this flag.
    pub fn install(&self) {
        let flag = self.clone();
        tokio::spawn(async move {
            wait_for_shutdown().await;
            flag.abort();
        });
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
pub async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, aborting session...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, aborting session...");
        }
    }
}
