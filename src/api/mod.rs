//! Microsoft Graph directory API surface used for provisioning.
//!
//! Three calls: an existence probe for an application, application creation,
//! and issuing a password credential on the created application.

pub mod client;
pub mod constants;
pub mod error;
pub mod models;

pub use client::GraphClient;
pub use error::ApiError;
pub use models::{ClientSecret, CreatedApplication, GraphError};
