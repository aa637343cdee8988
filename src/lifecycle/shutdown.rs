//! Signal handling for graceful shutdown
//!
//! The run loop is synchronous and owns the main thread, so signals are
//! awaited on a dedicated thread with its own tokio runtime and forwarded
//! as a stop request.

use std::io;
use std::thread::{self, JoinHandle};

use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, error, info};

use crate::manager::StopHandle;

/// Handles shutdown signals (SIGTERM, SIGINT)
pub struct ShutdownSignal;

impl ShutdownSignal {
    /// Create a new shutdown signal handler
    pub fn new() -> Self {
        Self
    }

    /// Wait for a shutdown signal
    pub async fn wait(&self) -> io::Result<()> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                debug!("received SIGTERM");
            }
            _ = sigint.recv() => {
                debug!("received SIGINT");
            }
        }
        Ok(())
    }

    /// Wait for a shutdown signal on a background thread, then stop the
    /// input manager through `stop`
    pub fn spawn_watcher(self, stop: StopHandle) -> io::Result<JoinHandle<()>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("shutdown-signal".to_string())
            .spawn(move || match runtime.block_on(self.wait()) {
                Ok(()) => {
                    info!("shutdown signal received");
                    stop.stop();
                }
                Err(e) => error!(?e, "failed to register signal handlers"),
            })
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_wait_pends_without_signal() {
        let result = tokio_test::block_on(async {
            tokio::time::timeout(Duration::from_millis(20), ShutdownSignal::new().wait()).await
        });
        assert!(result.is_err());
    }
}
