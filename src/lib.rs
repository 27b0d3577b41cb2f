//! Client for the E-goi push notification wrapper.
//!
//! Registers the device token with E-goi, shows received notifications,
//! reports open/cancel interactions and resolves the notification's action.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod payload;
pub mod platform;
pub mod service;
pub mod types;
pub mod ui;

#[cfg(feature = "tauri")]
pub mod notifications;

pub use api::PushApiClient;
pub use config::{AppConfig, DeepLinkHandler, Endpoints, Os};
pub use error::{PushError, Result};
pub use platform::{PermissionStatus, PlatformEvent, PushPlatform};
pub use service::PushService;
pub use types::{
    ActionDescriptor, ActionType, DeviceToken, DialogChoice, NotificationContext, PushDialog,
    PushEvent, RegistrationAlert,
};
pub use ui::{AlertPresenter, BrowserLauncher, PendingDialogs, SystemBrowser};
