//! The two provisioning runs, end to end.
use std::io::Write;

use afm_keycloak::{Keycloak, KeycloakConfig};

use crate::{
    error::ProvisionError,
    report::Reporter,
    role::{self, RoleAssignment},
    target::{LOGIN_PATH, MERCHANT_DASHBOARD_PATH, RoleTarget, UserTarget},
    user::{self, UserOutcome},
};

/// Acquires a fresh admin token for this run.
pub async fn connect<W: Write>(
    config: KeycloakConfig,
    reporter: &mut Reporter<W>,
) -> Result<Keycloak, ProvisionError> {
    reporter.step(format!("Connecting to Keycloak ({})...", config.address()));
    let keycloak = Keycloak::builder().with_config(config).build().await?;
    reporter.success("Admin token acquired");
    Ok(keycloak)
}

/// Leaves exactly one user with the target email and password.
pub async fn regular_user<W: Write>(
    config: KeycloakConfig,
    target: &UserTarget,
    reporter: &mut Reporter<W>,
) -> Result<UserOutcome, ProvisionError> {
    let keycloak = connect(config, reporter).await?;
    reporter.section();
    let outcome = user::ensure_user(&keycloak, target, reporter).await?;

    reporter.section();
    reporter.success("Setup complete!");
    reporter.info_block(
        "Credentials:",
        [
            format!("Email: {}", target.email),
            format!("Password: {}", target.password),
            "Role: Regular user (no special role)".to_string(),
        ],
    );
    reporter.info_block(
        "Login test:",
        [format!("{}{LOGIN_PATH}", keycloak.config().app_url())],
    );
    reporter.info_block(
        "This user can:",
        [
            "- Sign in to the application",
            "- Search businesses",
            "- Contact businesses",
            "- NOT access the merchant dashboard",
        ],
    );
    Ok(outcome)
}

/// Leaves the role in the realm and mapped exactly once onto the user.
pub async fn merchant_role<W: Write>(
    config: KeycloakConfig,
    target: &RoleTarget,
    reporter: &mut Reporter<W>,
) -> Result<RoleAssignment, ProvisionError> {
    let keycloak = connect(config, reporter).await?;

    reporter.section();
    reporter.step(format!("Creating role '{}'...", target.role_name));
    role::create_realm_role(&keycloak, target.role_name, target.description, reporter).await?;

    let Some(found_role) = role::realm_role(&keycloak, target.role_name, reporter).await? else {
        return Err(ProvisionError::RoleNotFound(target.role_name.to_string()));
    };
    reporter.success(format!(
        "Role found (ID: {})",
        found_role.id.as_deref().unwrap_or_default()
    ));

    reporter.section();
    reporter.step(format!("Looking up user {}...", target.user_email));
    let Some(user_id) = keycloak
        .user_by_email(target.user_email)
        .await?
        .and_then(|user| user.id)
    else {
        reporter.hint(format!(
            "Provision {} before running the role setup",
            target.user_email
        ));
        return Err(ProvisionError::UserNotFound {
            email: target.user_email.to_string(),
        });
    };
    reporter.success(format!("User found (ID: {user_id})"));

    reporter.section();
    reporter.step(format!(
        "Assigning role '{}' to the user...",
        target.role_name
    ));
    let assignment = role::assign_realm_role(&keycloak, &user_id, found_role, reporter).await?;

    reporter.section();
    reporter.success("Setup complete!");
    reporter.section();
    reporter.info(format!(
        "User {} now has role '{}'",
        target.user_email, target.role_name
    ));
    reporter.info(format!("Can now access: {MERCHANT_DASHBOARD_PATH}"));
    Ok(assignment)
}

/// Process exit status of a run: 0 on success, 1 after printing the
/// diagnostic of a failure.
pub fn exit_status<T, W: Write>(
    result: Result<T, ProvisionError>,
    reporter: &mut Reporter<W>,
) -> u8 {
    match result {
        Ok(_) => 0,
        Err(err) => {
            reporter.error(&err);
            1
        }
    }
}
