//! Extraction of E-goi fields from raw platform notification payloads

use serde_json::Value;

use crate::types::{
    ActionDescriptor, NotificationContext, PushDialog, CLOSE_BUTTON_TEXT, DEFAULT_OK_TEXT,
};

/// What a single notification carries for this library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedPush {
    pub context: NotificationContext,
    pub dialog: PushDialog,
}

/// Parse a notification as delivered by the push plugin.
///
/// Missing or malformed nested fields never fail the parse, they fall back to
/// empty values so a dialog can still be shown.
pub fn parse_notification(payload: &Value) -> ReceivedPush {
    let data = inner_data(payload);
    let custom = &data["egoiCustomData"];

    let context = NotificationContext {
        contact_id: id_field(&custom["contactId"]),
        message_hash: id_field(&custom["messageHash"]),
    };

    let action = match &custom["actions"][0] {
        Value::Null => ActionDescriptor::default(),
        raw => serde_json::from_value(raw.clone()).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed notification action: {}", e);
            ActionDescriptor::default()
        }),
    };

    let title =
        text_field(&payload["title"]).or_else(|| text_field(&data["notification"]["title"]));
    let message =
        text_field(&payload["body"]).or_else(|| text_field(&data["notification"]["body"]));
    let ok_text = action
        .text
        .clone()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_OK_TEXT.to_string());

    ReceivedPush {
        context,
        dialog: PushDialog {
            title,
            message,
            close_text: CLOSE_BUTTON_TEXT.to_string(),
            ok_text,
            action,
        },
    }
}

/// `data.data` is sometimes delivered as a JSON-encoded string
fn inner_data(payload: &Value) -> Value {
    match &payload["data"]["data"] {
        Value::String(encoded) => serde_json::from_str(encoded).unwrap_or_else(|e| {
            tracing::warn!("Notification data is not valid JSON: {}", e);
            Value::Null
        }),
        other => other.clone(),
    }
}

fn text_field(value: &Value) -> Option<String> {
    value.as_str().filter(|s| !s.is_empty()).map(String::from)
}

fn id_field(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionType;
    use serde_json::json;

    fn sample_custom_data() -> Value {
        json!({
            "notification": { "title": "Inner title", "body": "Inner body" },
            "egoiCustomData": {
                "contactId": "contact-9",
                "messageHash": "hash-9",
                "actions": [
                    { "type": "deep", "url": "myapp://promo", "text": "See promo" }
                ]
            }
        })
    }

    #[test]
    fn test_parse_nested_object() {
        let payload = json!({
            "title": "Sale",
            "body": "50% off",
            "data": { "data": sample_custom_data() }
        });
        let push = parse_notification(&payload);

        assert_eq!(push.context.contact_id.as_deref(), Some("contact-9"));
        assert_eq!(push.context.message_hash.as_deref(), Some("hash-9"));
        assert_eq!(push.dialog.title.as_deref(), Some("Sale"));
        assert_eq!(push.dialog.message.as_deref(), Some("50% off"));
        assert_eq!(push.dialog.ok_text, "See promo");
        assert_eq!(push.dialog.close_text, "Close");
        assert_eq!(push.dialog.action.action_type, ActionType::Deep);
        assert_eq!(push.dialog.action.url.as_deref(), Some("myapp://promo"));
    }

    #[test]
    fn test_parse_string_encoded_data() {
        let encoded = sample_custom_data().to_string();
        let payload = json!({ "data": { "data": encoded } });
        let push = parse_notification(&payload);

        assert_eq!(push.context.contact_id.as_deref(), Some("contact-9"));
        assert_eq!(push.dialog.title.as_deref(), Some("Inner title"));
        assert_eq!(push.dialog.message.as_deref(), Some("Inner body"));
    }

    #[test]
    fn test_parse_missing_custom_data() {
        let payload = json!({ "title": "Hello" });
        let push = parse_notification(&payload);

        assert_eq!(push.context, NotificationContext::default());
        assert_eq!(push.dialog.title.as_deref(), Some("Hello"));
        assert!(push.dialog.message.is_none());
        assert_eq!(push.dialog.ok_text, "View");
        assert_eq!(push.dialog.action, ActionDescriptor::default());
    }

    #[test]
    fn test_parse_invalid_encoded_data() {
        let payload = json!({ "data": { "data": "{not json" } });
        let push = parse_notification(&payload);
        assert!(!push.context.is_complete());
        assert_eq!(push.dialog.ok_text, "View");
    }

    #[test]
    fn test_numeric_ids_are_stringified() {
        let payload = json!({
            "data": { "data": { "egoiCustomData": { "contactId": 1234, "messageHash": "h" } } }
        });
        let push = parse_notification(&payload);
        assert_eq!(push.context.contact_id.as_deref(), Some("1234"));
    }

    #[test]
    fn test_empty_actions_list() {
        let payload = json!({
            "data": { "data": {
                "egoiCustomData": { "contactId": "c", "messageHash": "h", "actions": [] }
            } }
        });
        let push = parse_notification(&payload);
        assert_eq!(push.dialog.action.action_type, ActionType::Unknown);
        assert_eq!(push.dialog.ok_text, "View");
    }
}
