// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)
// - SIGUSR1: Reopen log files

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::config::AppState;
use crate::logger;

/// Mark shutdown and wake the accept loop
///
/// `notify_one` stores a permit, so a signal that lands before the loop
/// reaches its `select!` is not lost.
fn request_shutdown(state: &AppState, signal: &str) {
    state.shutdown_requested.store(true, Ordering::SeqCst);
    logger::log_shutdown_requested(signal);
    state.shutdown_signal.notify_one();
}

/// Start signal handlers (Unix)
///
/// Handlers are registered before the listening task is spawned, so a
/// registration failure is reported to the caller.
///
/// | Signal  | Action         |
/// |---------|----------------|
/// | SIGTERM | Graceful stop  |
/// | SIGINT  | Graceful stop  |
/// | SIGUSR1 | Reopen logs    |
#[cfg(unix)]
pub fn start_signal_handler(state: Arc<AppState>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigusr1 = signal(SignalKind::user_defined1())?;

    logger::log_debug(&format!(
        "[Signal] Handlers registered for pid {}",
        std::process::id()
    ));

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    request_shutdown(&state, "SIGTERM");
                    break;
                }

                _ = sigint.recv() => {
                    request_shutdown(&state, "SIGINT");
                    break;
                }

                _ = sigusr1.recv() => {
                    match logger::reopen(&state.config) {
                        Ok(()) => logger::log_info("[Signal] SIGUSR1 received, log files reopened"),
                        Err(e) => logger::log_error(&format!("Failed to reopen log files: {e}")),
                    }
                }
            }
        }
    });

    Ok(())
}

/// Non-unix fallback, only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(state: Arc<AppState>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            request_shutdown(&state, "Ctrl+C");
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_request_shutdown_sets_flag_and_stores_permit() {
        let state = AppState::new(&Config::default());
        request_shutdown(&state, "SIGTERM");
        assert!(state.shutdown_requested.load(Ordering::SeqCst));
        // Permit was stored before anyone waited
        state.shutdown_signal.notified().await;
    }
}
