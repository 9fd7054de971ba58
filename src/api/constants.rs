//! API constants for the Microsoft Graph directory endpoints

/// Graph API root used when no override is configured
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Token scope covering the Graph API's statically consented permissions
pub const DEFAULT_GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Collection path for application registrations
pub const APPLICATIONS_PATH: &str = "applications";

/// Action segment that issues a new password credential
pub const ADD_PASSWORD_ACTION: &str = "addPassword";

/// Standard headers for Graph requests
pub mod headers {
    /// Content type for JSON requests
    pub const CONTENT_TYPE_JSON: &str = "application/json";
}

/// Fields the workflow reads out of Graph responses
pub mod fields {
    pub const OBJECT_ID: &str = "id";
    pub const APP_ID: &str = "appId";
    pub const SECRET_TEXT: &str = "secretText";
}

fn trim_base(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

/// Build the applications collection URL
pub fn applications_endpoint(base_url: &str) -> String {
    format!("{}/{}", trim_base(base_url), APPLICATIONS_PATH)
}

/// Build a single application URL
pub fn application_endpoint(base_url: &str, id: &str) -> String {
    format!("{}/{}/{}", trim_base(base_url), APPLICATIONS_PATH, id)
}

/// Build the addPassword action URL for an application object
pub fn add_password_endpoint(base_url: &str, object_id: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        trim_base(base_url),
        APPLICATIONS_PATH,
        object_id,
        ADD_PASSWORD_ACTION
    )
}
