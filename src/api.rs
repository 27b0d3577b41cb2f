//! HTTP client for the E-goi push wrapper API

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::Endpoints;
use crate::error::{PushError, Result};
use crate::types::{EventPayload, RegisterPayload};

pub struct PushApiClient {
    http: Client,
    endpoints: Endpoints,
}

impl PushApiClient {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            http: Client::new(),
            endpoints,
        }
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Register the device token with the E-goi list
    pub async fn register_device(&self, payload: &RegisterPayload) -> Result<Value> {
        self.post_json(&self.endpoints.register_url(), payload).await
    }

    /// Report a notification interaction
    pub async fn send_event(&self, payload: &EventPayload) -> Result<Value> {
        self.post_json(&self.endpoints.events_url(), payload).await
    }

    /// A JSON body is returned whatever the status; the API reports
    /// rejections such as a bad API key as JSON with a 4xx status.
    async fn post_json<T: Serialize>(&self, url: &str, body: &T) -> Result<Value> {
        let response = self.http.post(url).json(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => {
                if !status.is_success() {
                    tracing::warn!("Push API answered HTTP {} with body {}", status, value);
                }
                Ok(value)
            }
            Err(_) if !status.is_success() => Err(PushError::Api(format!("HTTP {}", status))),
            Err(e) => Err(e.into()),
        }
    }
}

/// Interpretation of the `POST /token` response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationResponse {
    Registered,
    Rejected,
}

impl RegistrationResponse {
    pub fn from_body(body: &Value) -> Self {
        let registered = match body {
            Value::String(s) => s.eq_ignore_ascii_case("ok"),
            Value::Bool(b) => *b,
            Value::Object(map) => {
                map.get("success").and_then(Value::as_bool).unwrap_or(false)
                    || map
                        .get("status")
                        .and_then(Value::as_str)
                        .map(|s| s.eq_ignore_ascii_case("ok"))
                        .unwrap_or(false)
            }
            _ => false,
        };

        if registered {
            RegistrationResponse::Registered
        } else {
            RegistrationResponse::Rejected
        }
    }
}

/// The events endpoint answers with the plain JSON string "OK"
pub fn is_event_accepted(body: &Value) -> bool {
    body.as_str() == Some("OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Os;
    use crate::types::PushEvent;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn register_payload() -> RegisterPayload {
        RegisterPayload {
            api_key: "key".into(),
            app_id: 12,
            token: "device-token".into(),
            os: Os::Android,
            two_steps_data: None,
        }
    }

    #[test]
    fn test_registration_response_interpretation() {
        assert_eq!(RegistrationResponse::from_body(&json!("OK")), RegistrationResponse::Registered);
        assert_eq!(RegistrationResponse::from_body(&json!("ok")), RegistrationResponse::Registered);
        assert_eq!(
            RegistrationResponse::from_body(&json!({"success": true})),
            RegistrationResponse::Registered
        );
        assert_eq!(
            RegistrationResponse::from_body(&json!({"status": "OK"})),
            RegistrationResponse::Registered
        );
        assert_eq!(
            RegistrationResponse::from_body(&json!({"success": false, "error": "bad key"})),
            RegistrationResponse::Rejected
        );
        assert_eq!(RegistrationResponse::from_body(&Value::Null), RegistrationResponse::Rejected);
    }

    #[test]
    fn test_event_accepted_only_on_ok() {
        assert!(is_event_accepted(&json!("OK")));
        assert!(!is_event_accepted(&json!("ok")));
        assert!(!is_event_accepted(&json!({"status": "OK"})));
    }

    #[tokio::test]
    async fn test_register_device_posts_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "api_key": "key",
                "app_id": 12,
                "token": "device-token",
                "os": "android"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("OK")))
            .expect(1)
            .mount(&server)
            .await;

        let client = PushApiClient::new(Endpoints::new(server.uri()));
        let body = client.register_device(&register_payload()).await.unwrap();
        assert_eq!(body, json!("OK"));
    }

    #[tokio::test]
    async fn test_send_event_posts_to_event_path() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/event"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("OK")))
            .expect(1)
            .mount(&server)
            .await;

        let client = PushApiClient::new(Endpoints::new(server.uri()));
        let payload = EventPayload {
            api_key: "key".into(),
            app_id: 12,
            contact: "c".into(),
            os: Os::Ios,
            message_hash: "h".into(),
            event: PushEvent::Open,
            device_id: "device-token".into(),
        };
        let body = client.send_event(&payload).await.unwrap();
        assert!(is_event_accepted(&body));
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = PushApiClient::new(Endpoints::new(server.uri()));
        let err = client.register_device(&register_payload()).await.unwrap_err();
        match err {
            PushError::Api(msg) => assert!(msg.contains("500")),
            other => panic!("Expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_json_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = PushApiClient::new(Endpoints::new(server.uri()));
        let err = client.register_device(&register_payload()).await.unwrap_err();
        assert!(matches!(err, PushError::Json(_)));
    }

    #[tokio::test]
    async fn test_rejection_with_json_body_returns_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"success": false, "error": "invalid api key"})),
            )
            .mount(&server)
            .await;

        let client = PushApiClient::new(Endpoints::new(server.uri()));
        let body = client.register_device(&register_payload()).await.unwrap();
        assert_eq!(body["error"], "invalid api key");
        assert_eq!(RegistrationResponse::from_body(&body), RegistrationResponse::Rejected);
    }

    #[tokio::test]
    async fn test_custom_http_client_is_used() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("user-agent", "egoi-push-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("OK")))
            .expect(1)
            .mount(&server)
            .await;

        let http = Client::builder().user_agent("egoi-push-test").build().unwrap();
        let client = PushApiClient::new(Endpoints::new(server.uri())).with_http_client(http);
        assert_eq!(client.endpoints().base_url, server.uri());

        let body = client.register_device(&register_payload()).await.unwrap();
        assert_eq!(body, json!("OK"));
    }
}
