use {super::*, tokio::signal::ctrl_c};

/// Returns a token that is cancelled on the first SIGINT or SIGTERM. Every
/// long-running task selects on it and winds down.
pub(crate) fn setup_signal_handler() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    tokio::spawn(async move {
        wait_for_shutdown().await;
        trigger.cancel();
    });

    cancel
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(err) => {
            warn!("Failed to install SIGTERM handler: {err}");
            ctrl_c().await.ok();
            info!("Received Ctrl-C, shutting down");
            return;
        }
    };

    tokio::select! {
        _ = ctrl_c() => info!("Received Ctrl-C, shutting down"),
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    ctrl_c().await.ok();
    info!("Received Ctrl-C, shutting down");
}
