//! Presentation seams: alerts, push dialogs and the external browser

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{oneshot, Mutex};

use crate::error::{PushError, Result};
use crate::types::{DialogChoice, PushDialog, RegistrationAlert};

/// Shows alerts and notification dialogs to the user
#[async_trait]
pub trait AlertPresenter: Send + Sync {
    /// Show the outcome of a device registration
    async fn present_registration_alert(&self, alert: &RegistrationAlert) -> Result<()>;

    /// Show a received notification and wait for the user's choice
    async fn present_push(&self, dialog: &PushDialog) -> Result<DialogChoice>;
}

/// Opens web URLs outside the app
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn open_url(&self, url: &str) -> Result<()>;
}

/// Opens URLs with the operating system's default browser
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

#[async_trait]
impl BrowserLauncher for SystemBrowser {
    async fn open_url(&self, url: &str) -> Result<()> {
        tracing::info!("Opening notification link in browser: {}", url);
        open::that(url).map_err(|e| PushError::Presentation(e.to_string()))
    }
}

/// Dialogs shown by a separate frontend, waiting for the user's answer
#[derive(Default)]
pub struct PendingDialogs {
    pending: Mutex<HashMap<String, oneshot::Sender<DialogChoice>>>,
}

impl PendingDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new dialog. Entries whose waiter has gone away are dropped here.
    pub async fn open(&self) -> (String, oneshot::Receiver<DialogChoice>) {
        let id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();

        let mut pending = self.pending.lock().await;
        pending.retain(|_, waiter| !waiter.is_closed());
        pending.insert(id.clone(), tx);

        (id, rx)
    }

    /// Deliver the answer for a dialog. Returns false for unknown or abandoned ids.
    pub async fn resolve(&self, id: &str, choice: DialogChoice) -> bool {
        match self.pending.lock().await.remove(id) {
            Some(tx) => tx.send(choice).is_ok(),
            None => {
                tracing::warn!("No pending push dialog with id {}", id);
                false
            }
        }
    }

    pub async fn cancel(&self, id: &str) {
        self.pending.lock().await.remove(id);
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }
}
