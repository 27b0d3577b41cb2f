//! Tauri presenter for the push client.
//!
//! Registration alerts are shown as native notifications. Push dialogs are
//! handed to the webview as a `egoi-push://dialog` event; the frontend answers
//! through a host command that calls [`TauriPresenter::resolve_dialog`].

use async_trait::async_trait;
use serde::Serialize;
use tauri::{AppHandle, Emitter};
use tauri_plugin_notification::NotificationExt;

use crate::error::{PushError, Result};
use crate::types::{DialogChoice, PushDialog, RegistrationAlert};
use crate::ui::{AlertPresenter, PendingDialogs};

pub const PUSH_DIALOG_EVENT: &str = "egoi-push://dialog";

/// Payload of the dialog event sent to the webview
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogRequest {
    pub id: String,
    pub dialog: PushDialog,
}

pub struct TauriPresenter {
    app_handle: AppHandle,
    dialogs: PendingDialogs,
}

impl TauriPresenter {
    pub fn new(app_handle: AppHandle) -> Self {
        Self {
            app_handle,
            dialogs: PendingDialogs::new(),
        }
    }

    /// Deliver the user's answer for a dialog. Returns false for unknown ids.
    pub async fn resolve_dialog(&self, id: &str, choice: DialogChoice) -> bool {
        self.dialogs.resolve(id, choice).await
    }
}

#[async_trait]
impl AlertPresenter for TauriPresenter {
    async fn present_registration_alert(&self, alert: &RegistrationAlert) -> Result<()> {
        self.app_handle
            .notification()
            .builder()
            .title(alert.sub_header())
            .body(alert.message())
            .show()
            .map_err(|e| PushError::Presentation(e.to_string()))
    }

    async fn present_push(&self, dialog: &PushDialog) -> Result<DialogChoice> {
        let (id, rx) = self.dialogs.open().await;

        let request = DialogRequest {
            id: id.clone(),
            dialog: dialog.clone(),
        };
        if let Err(e) = self.app_handle.emit(PUSH_DIALOG_EVENT, request) {
            self.dialogs.cancel(&id).await;
            return Err(PushError::Presentation(e.to_string()));
        }

        rx.await
            .map_err(|_| PushError::Presentation("Push dialog dropped without an answer".into()))
    }
}
