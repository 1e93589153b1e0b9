//! # External reset signal.
//!
//! The pipeline has no graceful shutdown path of its own: it runs until the
//! environment resets it. On a hosted OS that reset arrives as a termination
//! signal, and [`external_reset`] completes when one is received.
//!
//! **Unix:** `SIGINT`, `SIGTERM`, `SIGQUIT`.
//! **Other platforms:** Ctrl-C via [`tokio::signal::ctrl_c`].

/// Completes on the first termination signal.
///
/// Returns `Err` if the listeners cannot be installed.
#[cfg(unix)]
pub async fn external_reset() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Completes on Ctrl-C.
#[cfg(not(unix))]
pub async fn external_reset() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
