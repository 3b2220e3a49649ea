use std::io::Write;

use afm_keycloak::{Keycloak, KeycloakError, RoleRepresentation, is_status};

use crate::{error::ProvisionError, report::Reporter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleCreation {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleAssignment {
    Assigned,
    AlreadyAssigned,
}

/// Plain realm-level role, neither composite nor bound to a client.
pub fn role_representation(name: &str, description: &str) -> RoleRepresentation {
    RoleRepresentation {
        name: Some(name.to_string()),
        description: Some(description.to_string()),
        composite: Some(false),
        client_role: Some(false),
        ..Default::default()
    }
}

/// Creates the realm role; a 409 means it is already there.
pub async fn create_realm_role<W: Write>(
    keycloak: &Keycloak,
    name: &str,
    description: &str,
    reporter: &mut Reporter<W>,
) -> Result<RoleCreation, ProvisionError> {
    match keycloak
        .create_role(role_representation(name, description))
        .await
    {
        Ok(()) => {
            reporter.success(format!("Role '{name}' created"));
            Ok(RoleCreation::Created)
        }
        Err(err) if is_status(&err, 409) => {
            reporter.note(format!("Role '{name}' already exists"));
            Ok(RoleCreation::AlreadyExists)
        }
        Err(err) => Err(failed(err)),
    }
}

/// Canonical representation of the role including its server id,
/// `None` when the realm has no role of that name.
pub async fn realm_role<W: Write>(
    keycloak: &Keycloak,
    name: &str,
    reporter: &mut Reporter<W>,
) -> Result<Option<RoleRepresentation>, ProvisionError> {
    reporter.step(format!("Fetching role '{name}'..."));
    Ok(keycloak.realm_role_by_name(name).await?)
}

/// Maps the role onto the user; a 409 means the mapping exists.
pub async fn assign_realm_role<W: Write>(
    keycloak: &Keycloak,
    user_id: &str,
    role: RoleRepresentation,
    reporter: &mut Reporter<W>,
) -> Result<RoleAssignment, ProvisionError> {
    let name = role.name.clone().unwrap_or_default();
    match keycloak.add_user_role(user_id, role).await {
        Ok(()) => {
            reporter.success(format!("Role '{name}' assigned to the user"));
            Ok(RoleAssignment::Assigned)
        }
        Err(err) if is_status(&err, 409) => {
            reporter.note(format!("User already has role '{name}'"));
            Ok(RoleAssignment::AlreadyAssigned)
        }
        Err(err) => Err(failed(err)),
    }
}

fn failed(err: KeycloakError) -> ProvisionError {
    tracing::error!("{err:#?}");
    ProvisionError::Keycloak(err)
}
