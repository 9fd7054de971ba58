use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::sync::Arc;

use auth_init::auth::AzdCliCredential;
use auth_init::cli::Cli;
use auth_init::config::Config;
use auth_init::env_store::AzdEnvStore;
use auth_init::{Outcome, Provisioner};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // .env is optional; RUST_LOG and AUTH_INIT_* may come from it
    let dotenv = dotenvy::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Ok(path) = dotenv {
        debug!("Loaded environment from {:?}", path);
    }

    let cli = Cli::parse();
    info!("Starting auth-init");

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    debug!("Using Graph endpoint {}", config.graph.base_url);

    let credential = Arc::new(AzdCliCredential::new(&config.auth));
    let env_store = Arc::new(AzdEnvStore::new(&config.env_store));
    let provisioner = Provisioner::new(config, credential, env_store)
        .context("Failed to initialize HTTP client")?;

    match provisioner.run(cli.app_id.as_deref()).await? {
        Outcome::AlreadyExists { app_id } => info!("Application {} verified", app_id),
        Outcome::Created(app) => info!(
            "Provisioned application {} (client id {})",
            app.application.object_id, app.application.app_id
        ),
    }

    Ok(())
}
