//! Cooperative cancellation shared between a batch run and its controller

use std::sync::Arc;
use tokio::sync::watch;

/// Cancellation flag that can be awaited
///
/// Clones observe the same flag. Cancelling is permanent for the token.
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Request cancellation; batches stop before their next probe
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once cancellation has been requested
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so this only returns once the flag is set
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }

    /// Cancel this token when the process receives Ctrl-C
    pub fn cancel_on_ctrl_c(&self) -> tokio::task::JoinHandle<()> {
        let token = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        })
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
