use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::constants::fields;
use super::error::ApiError;
use crate::config::{ApplicationSettings, SecretSettings};

/// Body of `POST /applications`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    pub display_name: String,
    pub sign_in_audience: String,
    pub web: WebSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSettings {
    pub redirect_uris: Vec<String>,
    pub implicit_grant_settings: ImplicitGrantSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplicitGrantSettings {
    pub enable_id_token_issuance: bool,
}

impl From<&ApplicationSettings> for ApplicationRequest {
    fn from(settings: &ApplicationSettings) -> Self {
        Self {
            display_name: settings.display_name.clone(),
            sign_in_audience: settings.sign_in_audience.clone(),
            web: WebSettings {
                redirect_uris: vec![settings.redirect_uri.clone()],
                implicit_grant_settings: ImplicitGrantSettings {
                    enable_id_token_issuance: settings.enable_id_token_issuance,
                },
            },
        }
    }
}

/// Body of `POST /applications/{id}/addPassword`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPasswordRequest {
    pub password_credential: PasswordCredential,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordCredential {
    pub display_name: String,
    pub start_date_time: String,
    pub end_date_time: String,
}

impl AddPasswordRequest {
    /// Build a credential request valid from `start` for the configured lifetime.
    pub fn starting_at(settings: &SecretSettings, start: DateTime<Utc>) -> Self {
        let end = start + Duration::days(i64::from(settings.lifetime_days));
        Self {
            password_credential: PasswordCredential {
                display_name: settings.display_name.clone(),
                start_date_time: graph_timestamp(start),
                end_date_time: graph_timestamp(end),
            },
        }
    }
}

/// UTC ISO-8601 with microseconds and a literal `Z`
pub fn graph_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Identifiers of a freshly created application registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedApplication {
    /// Directory-internal object id (`id`)
    pub object_id: String,
    /// Client-facing application id (`appId`)
    pub app_id: String,
}

impl CreatedApplication {
    pub fn from_body(body: &str) -> Result<Self, ApiError> {
        let json = parse_success_body(body, fields::OBJECT_ID)?;
        Ok(Self {
            object_id: required_str(&json, fields::OBJECT_ID)?,
            app_id: required_str(&json, fields::APP_ID)?,
        })
    }
}

/// Plaintext client secret. Graph returns it exactly once.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn from_body(body: &str) -> Result<Self, ApiError> {
        let json = parse_success_body(body, fields::SECRET_TEXT)?;
        required_str(&json, fields::SECRET_TEXT).map(Self)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(<redacted>)")
    }
}

/// Graph error envelope: `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GraphError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
struct GraphErrorEnvelope {
    error: GraphError,
}

impl GraphError {
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str::<GraphErrorEnvelope>(body)
            .ok()
            .map(|envelope| envelope.error)
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

// A success body that isn't JSON has none of the fields we need.
fn parse_success_body(body: &str, first_field: &'static str) -> Result<Value, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        log::debug!("Success response is not JSON: {}", e);
        ApiError::MissingField(first_field)
    })
}

fn required_str(json: &Value, field: &'static str) -> Result<String, ApiError> {
    json.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::MissingField(field))
}
