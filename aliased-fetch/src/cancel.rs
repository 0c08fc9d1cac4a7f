//! Run-wide cancellation
//!
//! One token is shared by the runner, the phases and every worker. It is
//! triggered by an OS signal or by the first failing worker, and never reset.

use std::sync::Arc;
use tokio::sync::watch;

use crate::error::{FetchError, Result};

#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Triggers cancellation; idempotent
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Completes once the token has been triggered
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives in `self`, so the channel cannot close here
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }

    /// Fails with [`FetchError::Cancelled`] once triggered
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(FetchError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
