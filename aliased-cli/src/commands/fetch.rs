//! Fetch command handler
//!
//! Wires OS signals to the run's cancellation token, runs discovery, and
//! reports a single terminal status. All discovery logic lives in
//! `aliased-fetch`.

use aliased_client::StdinMfaPrompt;
use aliased_core::AccountStore;
use aliased_fetch::{CancelToken, FetchConfig, discover};
use anyhow::{Context, Result};
use colored::*;
use std::future::Future;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::Config;

/// Handle the fetch command
pub async fn handle_fetch_command(profile: &str, account_role: &str, config: &Config) -> Result<()> {
    let fetch_config = FetchConfig::from_env();
    debug!("Fetch configuration: {:?}", fetch_config);

    let store = AccountStore::at(&config.paths);
    let cancel = CancelToken::new();
    let signals = spawn_signal_listener(shutdown_signal(), cancel.clone());

    let result = discover(
        &cancel,
        profile,
        account_role,
        fetch_config,
        &StdinMfaPrompt,
        &store,
    )
    .await;

    signals.abort();

    let accounts = result.with_context(|| format!("Failed to fetch accounts with profile {}", profile))?;

    println!(
        "{} {} account(s) to {}",
        "Saved".green(),
        accounts.len(),
        store.path().display().to_string().cyan()
    );

    Ok(())
}

/// Cancels `cancel` once `shutdown` resolves
fn spawn_signal_listener<F>(shutdown: F, cancel: CancelToken) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        shutdown.await;
        warn!("Received shutdown signal, cancelling");
        cancel.cancel();
    })
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for interrupt: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for terminate: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_shutdown_cancels_token() {
        let (tx, rx) = oneshot::channel::<()>();
        let cancel = CancelToken::new();
        let listener = spawn_signal_listener(
            async move {
                let _ = rx.await;
            },
            cancel.clone(),
        );

        assert!(!cancel.is_cancelled());
        tx.send(()).unwrap();
        listener.await.unwrap();
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_abort_leaves_token_untouched() {
        let cancel = CancelToken::new();
        let listener = spawn_signal_listener(std::future::pending(), cancel.clone());

        listener.abort();
        assert!(listener.await.unwrap_err().is_cancelled());
        assert!(!cancel.is_cancelled());
    }
}
