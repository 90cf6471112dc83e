//! Process signal handling

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Resolves on Ctrl+C, SIGTERM or SIGQUIT
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut term = signal(SignalKind::terminate()).expect("failed to install signal handler");
        let mut quit = signal(SignalKind::quit()).expect("failed to install signal handler");
        tokio::select! {
            _ = term.recv() => {},
            _ = quit.recv() => {},
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Shutdown signal received, starting graceful shutdown...");
}

/// Cancel `token` once a shutdown signal arrives.
///
/// The listener also exits quietly if the token is cancelled elsewhere.
pub fn spawn_shutdown_listener(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown_signal() => token.cancel(),
            _ = token.cancelled() => {},
        }
    })
}
