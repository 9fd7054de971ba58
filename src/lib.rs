pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod env_store;
pub mod provision;

pub use provision::{Outcome, ProvisionError, Provisioner};
