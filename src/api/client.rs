use chrono::Utc;
use log::{debug, error, info};

use super::constants::{self, headers};
use super::error::ApiError;
use super::models::{AddPasswordRequest, ApplicationRequest, ClientSecret, CreatedApplication};
use crate::auth::AccessToken;
use crate::config::{ApplicationSettings, GraphSettings, SecretSettings};

/// Microsoft Graph client for application registrations
#[derive(Debug, Clone)]
pub struct GraphClient {
    base_url: String,
    /// Existence checks run on transport defaults unless a probe timeout is set
    probe_client: reqwest::Client,
    /// Create and addPassword calls carry fixed connect/read timeouts
    write_client: reqwest::Client,
}

impl GraphClient {
    pub fn new(settings: &GraphSettings) -> Result<Self, ApiError> {
        let mut probe = reqwest::Client::builder().user_agent(user_agent());
        if let Some(timeout) = settings.probe_timeout() {
            probe = probe.timeout(timeout);
        }

        let write_client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout())
            .read_timeout(settings.read_timeout())
            .user_agent(user_agent())
            .build()?;

        Ok(Self {
            base_url: settings.base_url.clone(),
            probe_client: probe.build()?,
            write_client,
        })
    }

    /// `GET /applications/{id}`: exactly 200 means it exists.
    ///
    /// Any other status reads as "does not exist". A transport error is returned.
    pub async fn application_exists(
        &self,
        token: &AccessToken,
        app_id: &str,
    ) -> Result<bool, ApiError> {
        let url = constants::application_endpoint(&self.base_url, app_id);
        debug!("GET {}", url);

        let response = self
            .probe_client
            .get(&url)
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| {
                error!("An error occurred while checking application {}: {}", app_id, e);
                ApiError::Transport(e)
            })?;

        let status = response.status().as_u16();
        info!("Existence check for {} returned {}", app_id, status);
        Ok(status == 200)
    }

    /// `POST /applications`
    pub async fn create_application(
        &self,
        token: &AccessToken,
        settings: &ApplicationSettings,
    ) -> Result<CreatedApplication, ApiError> {
        let url = constants::applications_endpoint(&self.base_url);
        let payload = ApplicationRequest::from(settings);
        debug!("POST {}", url);

        let response = self
            .write_client
            .post(&url)
            .bearer_auth(token.secret())
            .header("Content-Type", headers::CONTENT_TYPE_JSON)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("An error occurred while creating application: {}", e);
                ApiError::Transport(e)
            })?;

        let status = response.status();
        let body = response.text().await?;
        info!("Create application response status: {}", status);

        if !status.is_success() {
            let err = ApiError::http(status.as_u16(), body);
            log_http_failure("Failed to create application", &err);
            return Err(err);
        }
        debug!("Create application response body: {}", body);

        CreatedApplication::from_body(&body).inspect_err(|e| {
            error!("Failed to parse create application response: {}", e);
        })
    }

    /// `POST /applications/{objectId}/addPassword`, valid from now for the configured lifetime.
    pub async fn add_client_secret(
        &self,
        token: &AccessToken,
        object_id: &str,
        settings: &SecretSettings,
    ) -> Result<ClientSecret, ApiError> {
        let url = constants::add_password_endpoint(&self.base_url, object_id);
        let payload = AddPasswordRequest::starting_at(settings, Utc::now());
        debug!(
            "POST {} (valid {} to {})",
            url,
            payload.password_credential.start_date_time,
            payload.password_credential.end_date_time
        );

        let response = self
            .write_client
            .post(&url)
            .bearer_auth(token.secret())
            .header("Content-Type", headers::CONTENT_TYPE_JSON)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("An error occurred while adding client secret: {}", e);
                ApiError::Transport(e)
            })?;

        // A 2xx body holds the plaintext secret and is never logged.
        let status = response.status();
        let body = response.text().await?;
        info!("Add client secret response status: {}", status);

        if !status.is_success() {
            let err = ApiError::http(status.as_u16(), body);
            log_http_failure("HTTP error occurred while adding client secret", &err);
            return Err(err);
        }

        ClientSecret::from_body(&body).inspect_err(|e| {
            error!("Failed to retrieve client secret: {}", e);
        })
    }
}

fn log_http_failure(what: &str, err: &ApiError) {
    for line in http_failure_lines(what, err) {
        error!("{}", line);
    }
}

/// Status, raw body and parsed Graph error (or a note that the body is not JSON).
fn http_failure_lines(what: &str, err: &ApiError) -> Vec<String> {
    let ApiError::Http {
        status,
        body,
        detail,
    } = err
    else {
        return Vec::new();
    };

    let mut lines = vec![
        format!("{}: HTTP {}", what, status),
        format!("Response body: {}", body),
    ];
    match detail {
        Some(detail) => lines.push(format!("Error details: {}", detail)),
        None if serde_json::from_str::<serde_json::Value>(body).is_err() => {
            lines.push("Response is not in JSON format.".to_string())
        }
        None => lines.push("No Graph error object in response".to_string()),
    }
    lines
}

fn user_agent() -> String {
    format!("auth-init/{}", env!("CARGO_PKG_VERSION"))
}
