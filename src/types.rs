//! Data types exchanged with the push wrapper API and the presentation layer

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Os;

/// Token assigned to this device by the platform push service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceToken(pub String);

impl DeviceToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifiers of the most recently received notification.
/// Replaced wholesale on every new notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationContext {
    pub contact_id: Option<String>,
    pub message_hash: Option<String>,
}

impl NotificationContext {
    pub fn is_complete(&self) -> bool {
        self.contact_id.is_some() && self.message_hash.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Http,
    Url,
    Deep,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Action attached to a notification, consumed when the user taps the ok button
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    #[serde(rename = "type", default)]
    pub action_type: ActionType,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushEvent {
    Open,
    Canceled,
}

impl PushEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            PushEvent::Open => "open",
            PushEvent::Canceled => "canceled",
        }
    }
}

impl fmt::Display for PushEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoStepsData {
    pub field: String,
    pub value: String,
}

/// Body of `POST /token`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterPayload {
    pub api_key: String,
    pub app_id: u64,
    pub token: String,
    pub os: Os,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_steps_data: Option<TwoStepsData>,
}

impl RegisterPayload {
    /// The two-steps object is only attached when both parts are present
    pub fn two_steps(field: Option<&str>, value: Option<&str>) -> Option<TwoStepsData> {
        match (field, value) {
            (Some(field), Some(value)) if !field.is_empty() && !value.is_empty() => {
                Some(TwoStepsData {
                    field: field.to_string(),
                    value: value.to_string(),
                })
            }
            _ => None,
        }
    }
}

/// Body of `POST /event`
#[derive(Debug, Clone, Serialize)]
pub struct EventPayload {
    pub api_key: String,
    pub app_id: u64,
    pub contact: String,
    pub os: Os,
    pub message_hash: String,
    pub event: PushEvent,
    pub device_id: String,
}

/// Alerts shown to the user about the device registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationAlert {
    Success,
    Failure,
    /// The platform push service refused to hand out a token
    PlatformError(String),
}

impl RegistrationAlert {
    pub fn header(&self) -> &'static str {
        "Alert"
    }

    pub fn sub_header(&self) -> &'static str {
        match self {
            RegistrationAlert::Success => "Device registered",
            RegistrationAlert::Failure => "Failed to register",
            RegistrationAlert::PlatformError(_) => "Registration error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            RegistrationAlert::Success => {
                "Successfully registered device on E-goi API.".to_string()
            }
            RegistrationAlert::Failure => {
                "There was a problem and we could not register your device on our database."
                    .to_string()
            }
            RegistrationAlert::PlatformError(detail) => {
                format!("Error on registration: {}", detail)
            }
        }
    }
}

pub const CLOSE_BUTTON_TEXT: &str = "Close";
pub const DEFAULT_OK_TEXT: &str = "View";

/// Two-button dialog built from a received notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushDialog {
    pub title: Option<String>,
    pub message: Option<String>,
    pub close_text: String,
    pub ok_text: String,
    pub action: ActionDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogChoice {
    Close,
    Open,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_payload_omits_two_steps_when_absent() {
        let payload = RegisterPayload {
            api_key: "key".into(),
            app_id: 1,
            token: "tok".into(),
            os: Os::Android,
            two_steps_data: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["os"], "android");
        assert!(json.get("two_steps_data").is_none());
    }

    #[test]
    fn test_two_steps_requires_both_parts() {
        assert!(RegisterPayload::two_steps(Some("email"), None).is_none());
        assert!(RegisterPayload::two_steps(None, Some("a@b.c")).is_none());
        assert!(RegisterPayload::two_steps(Some(""), Some("a@b.c")).is_none());

        let data = RegisterPayload::two_steps(Some("email"), Some("a@b.c")).unwrap();
        assert_eq!(data.field, "email");
        assert_eq!(data.value, "a@b.c");
    }

    #[test]
    fn test_event_payload_shape() {
        let payload = EventPayload {
            api_key: "key".into(),
            app_id: 3,
            contact: "c-1".into(),
            os: Os::Ios,
            message_hash: "h-1".into(),
            event: PushEvent::Canceled,
            device_id: "tok".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["event"], "canceled");
        assert_eq!(json["device_id"], "tok");
        assert_eq!(json["message_hash"], "h-1");
        assert_eq!(json["contact"], "c-1");
    }

    #[test]
    fn test_action_descriptor_unknown_type() {
        let action: ActionDescriptor =
            serde_json::from_str(r#"{"type":"ftp","url":"ftp://x"}"#).unwrap();
        assert_eq!(action.action_type, ActionType::Unknown);
        assert_eq!(action.url.as_deref(), Some("ftp://x"));
    }

    #[test]
    fn test_action_descriptor_empty_object() {
        let action: ActionDescriptor = serde_json::from_str("{}").unwrap();
        assert_eq!(action, ActionDescriptor::default());
    }

    #[test]
    fn test_registration_alert_texts() {
        assert_eq!(RegistrationAlert::Success.sub_header(), "Device registered");
        assert!(RegistrationAlert::Failure.message().contains("could not register"));
        assert_eq!(
            RegistrationAlert::PlatformError("no permission".into()).message(),
            "Error on registration: no permission"
        );
    }

    #[test]
    fn test_context_completeness() {
        let mut context = NotificationContext::default();
        assert!(!context.is_complete());
        context.contact_id = Some("c".into());
        assert!(!context.is_complete());
        context.message_hash = Some("h".into());
        assert!(context.is_complete());
    }
}
