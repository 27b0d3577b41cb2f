//! Seam to the native push notification plugin.
//!
//! The plugin asks the user for permission, registers with APNS/FCM and then
//! reports back through [`PlatformEvent`]s delivered to
//! [`PushService::run`](crate::service::PushService::run).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::DeviceToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

#[async_trait]
pub trait PushPlatform: Send + Sync {
    async fn request_permission(&self) -> Result<PermissionStatus>;

    /// Start registration with the platform push service. The token arrives
    /// later as [`PlatformEvent::Registration`].
    async fn register(&self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    Registration(DeviceToken),
    RegistrationError(String),
    /// Notification delivered while the app is in the foreground
    NotificationReceived(Value),
    /// User tapped a notification in the system tray
    ActionPerformed(Value),
}
