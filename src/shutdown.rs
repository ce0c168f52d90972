use tokio_util::sync::CancellationToken;
use tracing::info;

/// Graceful shutdown coordinator for wakey.
///
/// Owns the root cancellation token. In-flight wake sessions select on this
/// token at every suspension point, so a signal abandons them deterministically
/// instead of killing them mid-request. No compensating action is needed:
/// "start" is idempotent at the control plane.
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token to thread through sessions.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Spawn a listener that cancels the token on SIGINT or SIGTERM.
    pub fn spawn_signal_listener(&self) {
        let token = self.token.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            info!("shutdown signal received, abandoning in-flight sessions");
            token.cancel();
        });
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            tracing::warn!(error = %err, "failed to install SIGTERM handler, falling back to ctrl-c");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
