pub mod credentials;

pub use credentials::{AccessToken, AuthError, AzdCliCredential, StaticTokenCredential, TokenCredential};
