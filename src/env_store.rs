//! Persisting provisioned identifiers into the azd environment.

use async_trait::async_trait;
use log::{debug, warn};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::EnvStoreSettings;

/// Application object id
pub const AUTH_APP_ID: &str = "AUTH_APP_ID";
/// Application (client) id
pub const AUTH_CLIENT_ID: &str = "AUTH_CLIENT_ID";
/// Plaintext client secret
pub const AUTH_CLIENT_SECRET: &str = "AUTH_CLIENT_SECRET";

/// Durable name/value store for environment entries.
///
/// Writes are fire-and-forget: implementations report problems through the
/// log and never fail the run.
#[async_trait]
pub trait EnvStore: Send + Sync {
    async fn set(&self, name: &str, value: &str);
}

/// Runs `<program> <args...> NAME VALUE`, by default `azd env set NAME VALUE`.
#[derive(Debug, Clone)]
pub struct AzdEnvStore {
    program: String,
    args: Vec<String>,
}

impl AzdEnvStore {
    pub fn new(settings: &EnvStoreSettings) -> Self {
        Self {
            program: settings.program.clone(),
            args: settings.args.clone(),
        }
    }

    fn command_args<'a>(&'a self, name: &'a str, value: &'a str) -> Vec<&'a str> {
        self.args
            .iter()
            .map(String::as_str)
            .chain([name, value])
            .collect()
    }
}

#[async_trait]
impl EnvStore for AzdEnvStore {
    async fn set(&self, name: &str, value: &str) {
        debug!("Setting {} via {}", name, self.program);

        // Exit status is reported, not enforced.
        match Command::new(&self.program)
            .args(self.command_args(name, value))
            .stdin(Stdio::null())
            .status()
            .await
        {
            Ok(status) if status.success() => debug!("Set {}", name),
            Ok(status) => warn!("{} exited with {} while setting {}", self.program, status, name),
            Err(e) => warn!("Failed to run {} while setting {}: {}", self.program, name, e),
        }
    }
}
