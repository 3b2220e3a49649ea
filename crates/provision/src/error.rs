use afm_keycloak::{KeycloakError, session::KeycloakSessionError};

/// Everything that aborts a provisioning run.
///
/// Expected conflicts and absences never end up here, they are plain
/// values in [`crate::role`] and [`crate::user`].
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("admin login failed: {0}")]
    Session(#[from] KeycloakSessionError),
    #[error("admin request failed: {0}")]
    Keycloak(#[from] KeycloakError),
    #[error("role '{0}' not found")]
    RoleNotFound(String),
    #[error("user {email} not found")]
    UserNotFound { email: String },
    #[error("user {email} has no id after creation")]
    MissingUserId { email: String },
}

impl ProvisionError {
    /// HTTP status of the failed call, if the failure came from the server.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProvisionError::Session(KeycloakSessionError::HttpFailure { status, .. }) => {
                Some(*status)
            }
            ProvisionError::Session(KeycloakSessionError::ReqwestFailure(e)) => {
                e.status().map(|s| s.as_u16())
            }
            ProvisionError::Keycloak(KeycloakError::HttpFailure { status, .. }) => Some(*status),
            ProvisionError::Keycloak(KeycloakError::ReqwestFailure(e)) => {
                e.status().map(|s| s.as_u16())
            }
            _ => None,
        }
    }

    /// Response body of the failed call: pretty JSON when it parses,
    /// the raw text otherwise.
    pub fn body(&self) -> Option<String> {
        let text = match self {
            ProvisionError::Session(KeycloakSessionError::HttpFailure { text, .. }) => &**text,
            ProvisionError::Keycloak(KeycloakError::HttpFailure { text, .. }) => text.as_str(),
            _ => return None,
        };
        Some(render_body(text))
    }
}

fn render_body(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| text.to_string())
}
