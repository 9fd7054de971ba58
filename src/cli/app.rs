use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "auth-init", version)]
#[command(about = "Create an App Registration and client secret (if not already created)")]
#[command(long_about = "Create an App Registration and client secret (if not already created).\n\n\
If --appid names an application that already exists, nothing is created. Otherwise a new \
registration and client secret are created and recorded in the azd environment as \
AUTH_APP_ID, AUTH_CLIENT_ID and AUTH_CLIENT_SECRET.")]
#[command(after_help = "Example: auth-init --appid \"$AUTH_APP_ID\"")]
pub struct Cli {
    /// Optional. ID of registered application. If provided, this just makes sure it exists.
    #[arg(long = "appid", value_name = "ID")]
    pub app_id: Option<String>,

    /// Path to a TOML config file (defaults to <config dir>/auth-init/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
