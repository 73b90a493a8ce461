//! Process signal handling for cityscoped.
//!
//! SIGINT and SIGTERM request shutdown. SIGUSR1 requests an immediate
//! prediction cycle.

use tokio::sync::{broadcast, mpsc};
use tracing::{error, info};

/// Create a shutdown signal receiver.
///
/// Returns a broadcast receiver that will receive a signal when
/// SIGTERM or SIGINT is received.
pub fn shutdown_signal() -> broadcast::Receiver<()> {
    let (tx, rx) = broadcast::channel(1);

    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
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
                    error!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C)");
            }
            _ = terminate => {
                info!("Received SIGTERM");
            }
        }

        let _ = tx.send(());
    });

    rx
}

/// Create a receiver that yields once per SIGUSR1.
///
/// On platforms without SIGUSR1 the channel closes immediately.
pub fn regenerate_signal() -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel(1);

    #[cfg(unix)]
    tokio::spawn(async move {
        let mut signal =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::user_defined1()) {
                Ok(signal) => signal,
                Err(e) => {
                    error!("Failed to install SIGUSR1 handler: {}", e);
                    return;
                }
            };

        while signal.recv().await.is_some() {
            info!("Received SIGUSR1, requesting prediction cycle");
            // A request already queued covers this one
            if tx.try_send(()).is_err() && tx.is_closed() {
                break;
            }
        }
    });

    #[cfg(not(unix))]
    drop(tx);

    rx
}
