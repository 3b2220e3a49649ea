use std::sync::Arc;

pub use keycloak::{
    KeycloakAdmin, KeycloakError, KeycloakTokenSupplier,
    types::{CredentialRepresentation, RoleRepresentation, UserRepresentation},
};

use crate::session::{KeycloakSession, KeycloakSessionError};

pub use crate::config::Config as KeycloakConfig;

/// `true` when the error is an HTTP failure with the given status.
pub fn is_status(err: &KeycloakError, expected: u16) -> bool {
    matches!(err, KeycloakError::HttpFailure { status, .. } if *status == expected)
}

struct Inner {
    config: KeycloakConfig,
    admin: KeycloakAdmin<KeycloakSession>,
}

#[derive(Default)]
pub struct KeycloakBuilder {
    config: Option<KeycloakConfig>,
}

impl KeycloakBuilder {
    pub fn with_config(mut self, config: KeycloakConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Acquires the admin session. Without an explicit config the
    /// compiled-in one is used, the environment is never read.
    pub async fn build(self) -> Result<Keycloak, KeycloakSessionError> {
        let config = self.config.unwrap_or_else(KeycloakConfig::compiled_in);
        let client = reqwest::Client::new();
        let session = KeycloakSession::from_config(&config, client.clone()).await?;
        let admin = KeycloakAdmin::new(config.address(), session, client);
        Ok(Keycloak {
            inner: Arc::new(Inner { config, admin }),
        })
    }
}

/// Admin handle scoped to the configured realm.
#[derive(Clone)]
pub struct Keycloak {
    inner: Arc<Inner>,
}

impl Keycloak {
    pub fn builder() -> KeycloakBuilder {
        KeycloakBuilder::default()
    }

    pub fn config(&self) -> &KeycloakConfig {
        &self.inner.config
    }

    pub fn realm(&self) -> &str {
        self.inner.config.realm()
    }

    /// Looks a user up by email, exact match only.
    ///
    /// The server is asked for `exact=true`; candidates are still compared
    /// against `email` so a looser server-side match is never returned.
    /// The comparison ignores ASCII case only: Keycloak lower-cases emails
    /// when it stores them, so `User@AfroMarket.com` and
    /// `user@afromarket.com` name the same account, while any superstring
    /// or substring never matches.
    pub async fn user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserRepresentation>, KeycloakError> {
        let users = self
            .inner
            .admin
            .realm(self.realm())
            .users_get()
            .brief_representation(true)
            .exact(true)
            .email(email.to_string())
            .await
            .map_err(|e| {
                tracing::error!("{e:#?}");
                e
            })?;
        tracing::debug!("lookup of {email} returned {} candidate(s)", users.len());
        Ok(users.into_iter().find(|user| {
            user.email
                .as_deref()
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(email))
        }))
    }

    pub async fn create_user(&self, user: UserRepresentation) -> Result<(), KeycloakError> {
        self.inner
            .admin
            .realm(self.realm())
            .users_post(user)
            .await
            .map_err(|e| {
                tracing::error!("{e:#?}");
                e
            })?;
        Ok(())
    }

    /// Overwrites the password credential of a user.
    pub async fn update_password(
        &self,
        user_id: &str,
        credential: CredentialRepresentation,
    ) -> Result<(), KeycloakError> {
        self.inner
            .admin
            .realm(self.realm())
            .users_with_user_id_reset_password_put(user_id, credential)
            .await
            .map_err(|e| {
                tracing::error!("{e:#?}");
                e
            })?;
        Ok(())
    }

    /// Creates a realm role. Errors, including a 409 for an existing
    /// name, are handed back to the caller untouched.
    pub async fn create_role(&self, rep: RoleRepresentation) -> Result<(), KeycloakError> {
        self.inner
            .admin
            .realm(self.realm())
            .roles_post(rep)
            .await?;
        Ok(())
    }

    /// Fetches a realm role by name, `None` on 404.
    pub async fn realm_role_by_name(
        &self,
        role_name: &str,
    ) -> Result<Option<RoleRepresentation>, KeycloakError> {
        match self
            .inner
            .admin
            .realm(self.realm())
            .roles_with_role_name_get(role_name)
            .await
        {
            Ok(role) => Ok(Some(role)),
            Err(err) if is_status(&err, 404) => Ok(None),
            Err(err) => {
                tracing::error!("{err:#?}");
                Err(err)
            }
        }
    }

    /// Adds a realm role mapping to a user. Errors, including a 409 for
    /// an existing mapping, are handed back to the caller untouched.
    pub async fn add_user_role(
        &self,
        user_id: &str,
        role: RoleRepresentation,
    ) -> Result<(), KeycloakError> {
        self.inner
            .admin
            .realm(self.realm())
            .users_with_user_id_role_mappings_realm_post(user_id, vec![role])
            .await?;
        Ok(())
    }
}
