//! The provisioning workflow: verify an existing registration, or create one,
//! issue it a client secret and record the identifiers in the env store.

use colored::*;
use log::info;
use std::sync::Arc;
use thiserror::Error;

use crate::api::{ApiError, ClientSecret, CreatedApplication, GraphClient};
use crate::auth::{AuthError, TokenCredential};
use crate::config::Config;
use crate::env_store::{AUTH_APP_ID, AUTH_CLIENT_ID, AUTH_CLIENT_SECRET, EnvStore};

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("directory API call failed: {0}")]
    Api(#[from] ApiError),
}

/// What a run did
#[derive(Debug)]
pub enum Outcome {
    /// The supplied application exists; nothing was created or persisted.
    AlreadyExists { app_id: String },
    /// A new registration and secret were created and persisted.
    Created(ProvisionedApp),
}

#[derive(Debug)]
pub struct ProvisionedApp {
    pub application: CreatedApplication,
    pub secret: ClientSecret,
}

pub struct Provisioner {
    config: Config,
    graph: GraphClient,
    credential: Arc<dyn TokenCredential>,
    env_store: Arc<dyn EnvStore>,
}

impl Provisioner {
    pub fn new(
        config: Config,
        credential: Arc<dyn TokenCredential>,
        env_store: Arc<dyn EnvStore>,
    ) -> Result<Self, ProvisionError> {
        let graph = GraphClient::new(&config.graph)?;
        Ok(Self {
            config,
            graph,
            credential,
            env_store,
        })
    }

    pub async fn run(&self, app_id: Option<&str>) -> Result<Outcome, ProvisionError> {
        let token = self.credential.get_token(&self.config.graph.scope).await?;

        if let Some(app_id) = self.config.requested_app_id(app_id) {
            println!("Checking if application {} exists", app_id.cyan());
            if self.graph.application_exists(&token, app_id).await? {
                println!(
                    "{}",
                    "Application already exists, not creating new one.".green()
                );
                return Ok(Outcome::AlreadyExists {
                    app_id: app_id.to_string(),
                });
            }
            println!("{}", "Application not found".yellow());
        }

        println!("Creating application registration");
        let application = self
            .graph
            .create_application(&token, &self.config.application)
            .await?;
        info!(
            "Created application {} (client id {})",
            application.object_id, application.app_id
        );

        println!("Adding client secret to {}", application.object_id.cyan());
        let secret = self
            .graph
            .add_client_secret(&token, &application.object_id, &self.config.secret)
            .await?;

        println!(
            "Updating azd env with {}, {}, {}",
            AUTH_APP_ID, AUTH_CLIENT_ID, AUTH_CLIENT_SECRET
        );
        self.env_store
            .set(AUTH_APP_ID, &application.object_id)
            .await;
        self.env_store.set(AUTH_CLIENT_ID, &application.app_id).await;
        self.env_store
            .set(AUTH_CLIENT_SECRET, secret.expose())
            .await;

        Ok(Outcome::Created(ProvisionedApp {
            application,
            secret,
        }))
    }
}
