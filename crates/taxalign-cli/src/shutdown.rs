//! Ctrl+C and SIGTERM handling
//!
//! Commands run synchronously. A listener thread with its own single-threaded
//! runtime waits for a shutdown signal and cancels the shared
//! [`CancellationToken`]; the engine notices at its next check and unwinds with
//! a cancellation error.

use crate::error::Result;
use taxalign_core::CancellationToken;
use tokio::signal;
use tracing::{error, info};

/// Exit status of a run stopped by a signal (128 + SIGINT)
pub const EXIT_CANCELLED: i32 = 130;

/// Cancel `token` on the first Ctrl+C or SIGTERM
pub fn install(token: CancellationToken) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::Builder::new()
        .name("taxalign-signals".to_string())
        .spawn(move || {
            runtime.block_on(shutdown_signal());
            token.cancel();
        })?;
    Ok(())
}

async fn shutdown_signal() {
    // a listener that fails to install must not count as a signal
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, cancelling");
        },
        _ = terminate => {
            info!("Received terminate signal, cancelling");
        },
    }
}
