//! Push notification service.
//!
//! Owns the session state of a single device: the app credentials, the token
//! handed out by the platform, and the identifiers of the last notification.
//! Platform callbacks are fed in through [`PushService::run`] and handled one
//! at a time.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::api::{is_event_accepted, PushApiClient, RegistrationResponse};
use crate::config::{AppConfig, Os};
use crate::error::{PushError, Result};
use crate::payload::parse_notification;
use crate::platform::{PlatformEvent, PushPlatform};
use crate::types::{
    ActionDescriptor, ActionType, DeviceToken, DialogChoice, EventPayload, NotificationContext,
    PushEvent, RegisterPayload, RegistrationAlert,
};
use crate::ui::{AlertPresenter, BrowserLauncher};

#[derive(Default)]
struct SessionState {
    app: Option<AppConfig>,
    token: Option<DeviceToken>,
    context: NotificationContext,
}

pub struct PushService {
    api: PushApiClient,
    presenter: Arc<dyn AlertPresenter>,
    browser: Arc<dyn BrowserLauncher>,
    platform: Arc<dyn PushPlatform>,
    state: Mutex<SessionState>,
}

impl PushService {
    pub fn new(
        api: PushApiClient,
        presenter: Arc<dyn AlertPresenter>,
        browser: Arc<dyn BrowserLauncher>,
        platform: Arc<dyn PushPlatform>,
    ) -> Self {
        Self {
            api,
            presenter,
            browser,
            platform,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Store the app credentials and start platform registration
    pub async fn register(&self, config: AppConfig) -> Result<()> {
        tracing::info!("Registering push service for app {}", config.app_id);
        self.state.lock().await.app = Some(config);
        self.init_platform().await
    }

    async fn init_platform(&self) -> Result<()> {
        let permission = self.platform.request_permission().await?;

        if permission.is_granted() {
            self.platform.register().await?;
        } else {
            tracing::warn!("Push notification permission denied, device will not receive pushes");
        }

        Ok(())
    }

    /// The underlying push plugin, for hosts that need custom listeners
    pub fn platform(&self) -> Arc<dyn PushPlatform> {
        self.platform.clone()
    }

    pub async fn save_token(&self, token: DeviceToken) {
        tracing::info!("Received device token from platform");
        self.state.lock().await.token = Some(token);
    }

    pub async fn token(&self) -> Option<DeviceToken> {
        self.state.lock().await.token.clone()
    }

    pub async fn context(&self) -> NotificationContext {
        self.state.lock().await.context.clone()
    }

    /// Register the device on the E-goi API.
    ///
    /// Two-steps values given here replace the ones stored in the config.
    /// Returns the parsed response body; the user is shown a success or
    /// failure alert depending on it.
    pub async fn register_device(
        &self,
        two_steps_field: Option<&str>,
        two_steps_value: Option<&str>,
    ) -> Result<Value> {
        let payload = {
            let mut state = self.state.lock().await;
            let token = state.token.clone();
            let app = state.app.as_mut().ok_or_else(|| {
                tracing::error!("Cannot register device: {}", PushError::NotRegistered);
                PushError::NotRegistered
            })?;

            if let Some(field) = two_steps_field.filter(|f| !f.is_empty()) {
                app.two_steps_field = Some(field.to_string());
            }
            if let Some(value) = two_steps_value.filter(|v| !v.is_empty()) {
                app.two_steps_value = Some(value.to_string());
            }

            build_register_payload(app, token.as_ref()).map_err(|e| {
                tracing::error!("Cannot register device: {}", e);
                e
            })?
        };

        let body = self.api.register_device(&payload).await.map_err(|e| {
            tracing::error!("Device registration request failed: {}", e);
            e
        })?;

        let alert = match RegistrationResponse::from_body(&body) {
            RegistrationResponse::Registered => {
                tracing::info!("Device registered on E-goi API");
                RegistrationAlert::Success
            }
            RegistrationResponse::Rejected => {
                tracing::warn!("E-goi API rejected device registration: {}", body);
                RegistrationAlert::Failure
            }
        };
        self.present_registration_alert(&alert).await;

        Ok(body)
    }

    pub async fn present_registration_alert(&self, alert: &RegistrationAlert) {
        if let Err(e) = self.presenter.present_registration_alert(alert).await {
            tracing::warn!("Failed to present registration alert: {}", e);
        }
    }

    /// Process platform events until the sender side is dropped
    pub async fn run(&self, mut events: mpsc::Receiver<PlatformEvent>) {
        while let Some(event) = events.recv().await {
            if let Err(e) = self.handle_platform_event(event).await {
                tracing::error!("Failed to handle platform event: {}", e);
            }
        }
        tracing::info!("Platform event channel closed, push service stopped");
    }

    pub async fn handle_platform_event(&self, event: PlatformEvent) -> Result<()> {
        match event {
            PlatformEvent::Registration(token) => {
                self.save_token(token).await;
                Ok(())
            }
            PlatformEvent::RegistrationError(detail) => {
                tracing::error!("Platform push registration failed: {}", detail);
                self.present_registration_alert(&RegistrationAlert::PlatformError(detail))
                    .await;
                Ok(())
            }
            PlatformEvent::NotificationReceived(payload)
            | PlatformEvent::ActionPerformed(payload) => self.handle_received_push(&payload).await,
        }
    }

    /// Show a received notification and act on the user's choice
    pub async fn handle_received_push(&self, payload: &Value) -> Result<()> {
        let push = parse_notification(payload);
        self.state.lock().await.context = push.context;

        match self.presenter.present_push(&push.dialog).await? {
            DialogChoice::Close => {
                self.send_event(PushEvent::Canceled).await;
                Ok(())
            }
            DialogChoice::Open => match self.report_event(PushEvent::Open).await {
                Some(_) => self.handle_success_link(&push.dialog.action).await,
                None => {
                    tracing::warn!("Open event was not delivered, skipping notification action");
                    Ok(())
                }
            },
        }
    }

    /// Report an interaction with the current notification.
    ///
    /// Never fails: returns whether the API acknowledged the event. Nothing is
    /// sent when the app is not registered or the notification carried no
    /// E-goi identifiers.
    pub async fn send_event(&self, event: PushEvent) -> bool {
        self.report_event(event)
            .await
            .map(|body| is_event_accepted(&body))
            .unwrap_or(false)
    }

    /// Like [`send_event`](Self::send_event), but yields the parsed response
    /// body. `None` when nothing was sent or the request failed.
    pub async fn report_event(&self, event: PushEvent) -> Option<Value> {
        let payload = {
            let state = self.state.lock().await;
            let Some(app) = state.app.as_ref() else {
                tracing::error!("Cannot send {} event: {}", event, PushError::NotRegistered);
                return None;
            };
            let (Some(contact), Some(message_hash)) = (
                state.context.contact_id.clone(),
                state.context.message_hash.clone(),
            ) else {
                tracing::debug!("Notification has no E-goi identifiers, skipping {} event", event);
                return None;
            };
            let Some(os) = app.os else {
                tracing::error!("Cannot send {} event: {}", event, PushError::MissingField("os"));
                return None;
            };

            EventPayload {
                api_key: app.api_key.clone(),
                app_id: app.app_id,
                contact,
                os,
                message_hash,
                event,
                device_id: state.token.as_ref().map(|t| t.0.clone()).unwrap_or_default(),
            }
        };

        match self.api.send_event(&payload).await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::error!("Failed to send {} event: {}", event, e);
                None
            }
        }
    }

    /// Resolve the action of a notification the user chose to open
    pub async fn handle_success_link(&self, action: &ActionDescriptor) -> Result<()> {
        let deep_link_handler = {
            let state = self.state.lock().await;
            let app = state.app.as_ref().ok_or(PushError::NotRegistered)?;
            app.deep_link_handler.clone()
        };

        match action.action_type {
            ActionType::Http | ActionType::Url => match action.url.as_deref() {
                Some(url) if !url.is_empty() => self.browser.open_url(url).await,
                _ => {
                    tracing::warn!("Link action without url, nothing to open");
                    Ok(())
                }
            },
            ActionType::Deep => {
                let handler = deep_link_handler.ok_or_else(|| {
                    tracing::error!("{}", PushError::MissingDeepLinkHandler);
                    PushError::MissingDeepLinkHandler
                })?;
                match action.url.as_deref() {
                    Some(url) if !url.is_empty() => {
                        tracing::info!("Dispatching deep link: {}", url);
                        handler(url);
                    }
                    _ => tracing::warn!("Deep link action without url, nothing to dispatch"),
                }
                Ok(())
            }
            ActionType::Unknown => Ok(()),
        }
    }
}

/// Validates the required fields in the order appId, token, apiKey, os
fn build_register_payload(app: &AppConfig, token: Option<&DeviceToken>) -> Result<RegisterPayload> {
    if app.app_id == 0 {
        return Err(PushError::MissingField("appId"));
    }
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or(PushError::MissingField("token"))?;
    if app.api_key.is_empty() {
        return Err(PushError::MissingField("apiKey"));
    }
    let os: Os = app.os.ok_or(PushError::MissingField("os"))?;

    Ok(RegisterPayload {
        api_key: app.api_key.clone(),
        app_id: app.app_id,
        token: token.0.clone(),
        os,
        two_steps_data: RegisterPayload::two_steps(
            app.two_steps_field.as_deref(),
            app.two_steps_value.as_deref(),
        ),
    })
}
