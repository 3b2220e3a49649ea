use std::io::Write;

use afm_keycloak::{CredentialRepresentation, Keycloak, UserRepresentation};

use crate::{error::ProvisionError, report::Reporter, target::UserTarget};

/// Which path [`ensure_user`] took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserOutcome {
    Created { id: String },
    PasswordReset { id: String },
}

impl UserOutcome {
    pub fn id(&self) -> &str {
        match self {
            UserOutcome::Created { id } | UserOutcome::PasswordReset { id } => id,
        }
    }
}

/// Password credential that does not force a reset on first login.
pub fn password_credential(password: &str) -> CredentialRepresentation {
    CredentialRepresentation {
        type_: Some("password".to_string()),
        value: Some(password.to_string()),
        temporary: Some(false),
        ..Default::default()
    }
}

/// Full representation of a new, enabled and verified user whose
/// username is its email.
pub fn user_representation(target: &UserTarget) -> UserRepresentation {
    UserRepresentation {
        username: Some(target.email.to_string()),
        email: Some(target.email.to_string()),
        first_name: Some(target.first_name.to_string()),
        last_name: Some(target.last_name.to_string()),
        enabled: Some(true),
        email_verified: Some(true),
        credentials: Some(vec![password_credential(target.password)]),
        ..Default::default()
    }
}

/// Creates the user and resolves its id by a second lookup, the create
/// call itself answers without a body.
pub async fn create_user<W: Write>(
    keycloak: &Keycloak,
    target: &UserTarget,
    reporter: &mut Reporter<W>,
) -> Result<String, ProvisionError> {
    keycloak.create_user(user_representation(target)).await?;
    reporter.success(format!("User {} created", target.email));
    keycloak
        .user_by_email(target.email)
        .await?
        .and_then(|user| user.id)
        .ok_or_else(|| ProvisionError::MissingUserId {
            email: target.email.to_string(),
        })
}

/// Unconditionally replaces the password of an existing user.
pub async fn reset_password<W: Write>(
    keycloak: &Keycloak,
    user_id: &str,
    password: &str,
    reporter: &mut Reporter<W>,
) -> Result<(), ProvisionError> {
    keycloak
        .update_password(user_id, password_credential(password))
        .await?;
    reporter.success("Password updated");
    Ok(())
}

/// Resets the password when the email is taken, creates the user otherwise.
pub async fn ensure_user<W: Write>(
    keycloak: &Keycloak,
    target: &UserTarget,
    reporter: &mut Reporter<W>,
) -> Result<UserOutcome, ProvisionError> {
    reporter.step(format!("Looking up user {}...", target.email));
    let existing = keycloak
        .user_by_email(target.email)
        .await?
        .and_then(|user| user.id);
    match existing {
        Some(id) => {
            reporter.success(format!("User found (ID: {id})"));
            reporter.step("Updating password...");
            reset_password(keycloak, &id, target.password, reporter).await?;
            Ok(UserOutcome::PasswordReset { id })
        }
        None => {
            reporter.failure("User not found");
            reporter.step(format!("Creating user {}...", target.email));
            let id = create_user(keycloak, target, reporter).await?;
            tracing::debug!("created user {} with id {id}", target.email);
            Ok(UserOutcome::Created { id })
        }
    }
}
