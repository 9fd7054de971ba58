use thiserror::Error;

use super::models::GraphError;

/// Failure of a single directory API call.
///
/// A successful call is the `Ok` arm of `Result<T, ApiError>`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network-level failure: DNS, refused connection, timeout, TLS.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response. `detail` is the parsed Graph error when the body was JSON.
    #[error("HTTP {status}{}", detail_suffix(.detail, .body))]
    Http {
        status: u16,
        body: String,
        detail: Option<GraphError>,
    },

    /// 2xx response without a field the workflow depends on.
    #[error("'{0}' not found in response")]
    MissingField(&'static str),
}

fn detail_suffix(detail: &Option<GraphError>, body: &str) -> String {
    match detail {
        Some(detail) => format!(" ({})", detail),
        None if body.trim().is_empty() => String::new(),
        None => format!(": {}", body.trim()),
    }
}

impl ApiError {
    pub fn http(status: u16, body: String) -> Self {
        let detail = GraphError::from_body(&body);
        Self::Http {
            status,
            body,
            detail,
        }
    }

    pub fn is_missing_field(&self) -> bool {
        matches!(self, Self::MissingField(_))
    }
}
