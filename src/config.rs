//! App credentials and API endpoint configuration.
//!
//! `AppConfig` is supplied once by the host app when registering the push
//! service. Only the two-steps fields may change afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::PushError;

/// Production push wrapper host
pub const PRODUCTION_API_ENDPOINT: &str = "https://push-wrapper.egoiapp.com";
const REGISTER_DEVICE_PATH: &str = "/token";
const EVENTS_PATH: &str = "/event";

/// Callback invoked with the URL of a `deep` action
pub type DeepLinkHandler = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Ios,
    Android,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Ios => "ios",
            Os::Android => "android",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = PushError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ios" => Ok(Os::Ios),
            "android" => Ok(Os::Android),
            other => Err(PushError::InvalidConfig(format!("unknown os \"{}\"", other))),
        }
    }
}

/// Credentials of the E-goi app. Empty `api_key`, zero `app_id` and a missing
/// `os` are treated as not provided.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub app_id: u64,
    #[serde(default)]
    pub os: Option<Os>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_steps_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_steps_value: Option<String>,
    #[serde(skip)]
    pub deep_link_handler: Option<DeepLinkHandler>,
}

impl AppConfig {
    pub fn new(api_key: impl Into<String>, app_id: u64, os: Os) -> Self {
        Self {
            api_key: api_key.into(),
            app_id,
            os: Some(os),
            ..Default::default()
        }
    }

    pub fn with_two_steps(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.two_steps_field = Some(field.into());
        self.two_steps_value = Some(value.into());
        self
    }

    pub fn with_deep_link_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.deep_link_handler = Some(Arc::new(handler));
        self
    }

    /// Load credentials from `EGOI_API_KEY`, `EGOI_APP_ID`, `EGOI_OS`,
    /// `EGOI_TWO_STEPS_FIELD` and `EGOI_TWO_STEPS_VALUE`.
    pub fn from_env() -> Result<Self, PushError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, PushError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_id = match lookup("EGOI_APP_ID").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                PushError::InvalidConfig(format!("EGOI_APP_ID is not a number: {}", raw))
            })?,
            None => 0,
        };

        let os = lookup("EGOI_OS")
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.parse::<Os>())
            .transpose()?;

        Ok(Self {
            api_key: lookup("EGOI_API_KEY").unwrap_or_default(),
            app_id,
            os,
            two_steps_field: lookup("EGOI_TWO_STEPS_FIELD").filter(|v| !v.is_empty()),
            two_steps_value: lookup("EGOI_TWO_STEPS_VALUE").filter(|v| !v.is_empty()),
            deep_link_handler: None,
        })
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("app_id", &self.app_id)
            .field("os", &self.os)
            .field("two_steps_field", &self.two_steps_field)
            .field("two_steps_value", &self.two_steps_value)
            .field("deep_link_handler", &self.deep_link_handler.is_some())
            .finish()
    }
}

/// Location of the push wrapper API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub base_url: String,
    pub register_path: String,
    pub events_path: String,
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            register_path: REGISTER_DEVICE_PATH.to_string(),
            events_path: EVENTS_PATH.to_string(),
        }
    }

    pub fn production() -> Self {
        Self::new(PRODUCTION_API_ENDPOINT)
    }

    /// Production endpoints unless `EGOI_PUSH_API_ENDPOINT` overrides the host
    pub fn from_env() -> Self {
        match std::env::var("EGOI_PUSH_API_ENDPOINT") {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::production(),
        }
    }

    pub fn register_url(&self) -> String {
        format!("{}{}", self.base_url, self.register_path)
    }

    pub fn events_url(&self) -> String {
        format!("{}{}", self.base_url, self.events_path)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::production()
    }
}
