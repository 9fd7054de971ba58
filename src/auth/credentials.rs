use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use std::fmt;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

use crate::config::AuthSettings;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("token request failed (exit code {}): {stderr}. Run 'azd auth login' to sign in", code_label(.status))]
    Failed { status: Option<i32>, stderr: String },

    #[error("unexpected token output: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("token provider returned an empty token")]
    EmptyToken,
}

fn code_label(status: &Option<i32>) -> String {
    status.map_or_else(|| "none".to_string(), |code| code.to_string())
}

/// Bearer token for the directory API
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    expires_on: Option<String>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, expires_on: Option<String>) -> Self {
        Self {
            secret: secret.into(),
            expires_on,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn expires_on(&self) -> Option<&str> {
        self.expires_on.as_deref()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Source of bearer tokens for a scope
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, AuthError>;
}

/// Tokens from the Azure Developer CLI's signed-in session (`azd auth token`)
#[derive(Debug, Clone)]
pub struct AzdCliCredential {
    program: String,
    tenant_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzdTokenOutput {
    token: String,
    #[serde(default)]
    expires_on: Option<String>,
}

impl AzdCliCredential {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            program: settings.azd_program.clone(),
            tenant_id: settings.tenant_id.clone(),
        }
    }

    fn command_args(&self, scope: &str) -> Vec<String> {
        let mut args = vec![
            "auth".to_string(),
            "token".to_string(),
            "--output".to_string(),
            "json".to_string(),
            "--scope".to_string(),
            scope.to_string(),
        ];
        if let Some(tenant) = &self.tenant_id {
            args.push("--tenant-id".to_string());
            args.push(tenant.clone());
        }
        args
    }

    fn parse_output(stdout: &[u8]) -> Result<AccessToken, AuthError> {
        let output: AzdTokenOutput = serde_json::from_slice(stdout)?;
        if output.token.is_empty() {
            return Err(AuthError::EmptyToken);
        }
        Ok(AccessToken::new(output.token, output.expires_on))
    }
}

#[async_trait]
impl TokenCredential for AzdCliCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, AuthError> {
        debug!("Requesting token for {} via {}", scope, self.program);

        let output = Command::new(&self.program)
            .args(self.command_args(scope))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| AuthError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(AuthError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let token = Self::parse_output(&output.stdout)?;
        info!(
            "Obtained token for {} (expires {})",
            scope,
            token.expires_on().unwrap_or("unknown")
        );
        Ok(token)
    }
}

/// A token the caller already holds
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(secret, None),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scope: &str) -> Result<AccessToken, AuthError> {
        if self.token.secret().is_empty() {
            return Err(AuthError::EmptyToken);
        }
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn azd_args_include_scope_and_tenant() {
        let mut settings = AuthSettings::default();
        let credential = AzdCliCredential::new(&settings);
        assert_eq!(
            credential.command_args("https://graph.microsoft.com/.default"),
            vec![
                "auth",
                "token",
                "--output",
                "json",
                "--scope",
                "https://graph.microsoft.com/.default"
            ]
        );

        settings.tenant_id = Some("contoso-tenant".into());
        let args = AzdCliCredential::new(&settings).command_args("scope");
        assert_eq!(&args[args.len() - 2..], ["--tenant-id", "contoso-tenant"]);
    }

    #[test]
    fn parses_azd_token_output() {
        let token = AzdCliCredential::parse_output(
            br#"{"token":"eyJ0eXAi","expiresOn":"2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(token.secret(), "eyJ0eXAi");
        assert_eq!(token.expires_on(), Some("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn rejects_bad_azd_output() {
        assert!(matches!(
            AzdCliCredential::parse_output(b"ERROR: not logged in"),
            Err(AuthError::Malformed(_))
        ));
        assert!(matches!(
            AzdCliCredential::parse_output(br#"{"token":""}"#),
            Err(AuthError::EmptyToken)
        ));
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = AccessToken::new("very-secret", None);
        let rendered = format!("{:?}", token);
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let settings = AuthSettings {
            tenant_id: None,
            azd_program: "auth-init-definitely-not-installed".into(),
        };
        let err = AzdCliCredential::new(&settings)
            .get_token("scope")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Spawn { .. }));
    }

    #[tokio::test]
    async fn static_credential() {
        let token = StaticTokenCredential::new("tok").get_token("any").await.unwrap();
        assert_eq!(token.secret(), "tok");

        assert!(StaticTokenCredential::new("").get_token("any").await.is_err());
    }

    #[test]
    fn failed_message_points_at_login() {
        let err = AuthError::Failed {
            status: Some(1),
            stderr: "not logged in".into(),
        };
        assert_eq!(
            err.to_string(),
            "token request failed (exit code 1): not logged in. Run 'azd auth login' to sign in"
        );
    }
}
