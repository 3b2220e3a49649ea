use std::sync::Arc;

use keycloak::{KeycloakError, KeycloakTokenSupplier};

use crate::config::Config;

#[derive(Debug, Clone)]
pub enum KeycloakSessionError {
    ReqwestFailure(Arc<reqwest::Error>),
    HttpFailure { status: u16, text: Arc<str> },
    Decode(Arc<serde_json::Error>),
}

impl From<reqwest::Error> for KeycloakSessionError {
    fn from(value: reqwest::Error) -> Self {
        KeycloakSessionError::ReqwestFailure(Arc::new(value))
    }
}

impl std::error::Error for KeycloakSessionError {}
impl std::fmt::Display for KeycloakSessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeycloakSessionError::HttpFailure { status, .. } => {
                write!(f, "token request failed with status {status}")
            }
            KeycloakSessionError::ReqwestFailure(e) => e.fmt(f),
            KeycloakSessionError::Decode(e) => e.fmt(f),
        }
    }
}

async fn error(response: reqwest::Response) -> Result<reqwest::Response, KeycloakSessionError> {
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await;
        return match text {
            Ok(text) => Err(KeycloakSessionError::HttpFailure {
                status: status.as_u16(),
                text: Arc::from(text),
            }),
            Err(e) => Err(KeycloakSessionError::ReqwestFailure(Arc::new(e))),
        };
    }

    Ok(response)
}

/// The claims of the admin access token that are worth logging.
#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct ParsedAccessToken {
    exp: Option<usize>,
    iss: Option<String>,
    sub: Option<String>,
    preferred_username: Option<String>,
}

impl ParsedAccessToken {
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }

    /// Expiry as seconds since the epoch.
    pub fn expires_at(&self) -> Option<usize> {
        self.exp
    }

    pub fn preferred_username(&self) -> Option<&str> {
        self.preferred_username.as_deref()
    }

    pub fn issuer(&self) -> Option<&str> {
        self.iss.as_deref()
    }
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct KeycloakSessionToken {
    access_token: Arc<str>,
    #[serde(default)]
    expires_in: usize,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(skip)]
    parsed_access_token: Option<ParsedAccessToken>,
}

impl KeycloakSessionToken {
    fn parse_access_token(mut token: Self) -> Self {
        use base64::engine::{Engine, general_purpose::URL_SAFE_NO_PAD};
        token.parsed_access_token = token
            .access_token
            .split('.')
            .nth(1)
            .and_then(|s| {
                URL_SAFE_NO_PAD
                    .decode(s.trim_end_matches('='))
                    .map_err(|e| {
                        tracing::debug!("access token payload is not base64url: {e}");
                        e
                    })
                    .ok()
            })
            .and_then(|b| {
                serde_json::from_slice::<ParsedAccessToken>(&b)
                    .map_err(|e| {
                        tracing::debug!("access token payload is not a claim set: {e}");
                        e
                    })
                    .ok()
            });
        token
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_in(&self) -> usize {
        self.expires_in
    }

    pub fn claims(&self) -> Option<&ParsedAccessToken> {
        self.parsed_access_token.as_ref()
    }
}

struct KeycloakSessionClientInner {
    url: Arc<str>,
    realm: Arc<str>,
    client_id: Arc<str>,
    client: reqwest::Client,
}

/// Client for the OpenID Connect token endpoint of one realm.
#[derive(Clone)]
pub struct KeycloakSessionClient {
    inner: Arc<KeycloakSessionClientInner>,
}

impl KeycloakSessionClient {
    pub fn new<T>(url: T, realm: T, client_id: T, client: reqwest::Client) -> Self
    where
        T: Into<String>,
    {
        Self {
            inner: Arc::new(KeycloakSessionClientInner {
                url: Arc::from(url.into()),
                realm: Arc::from(realm.into()),
                client_id: Arc::from(client_id.into()),
                client,
            }),
        }
    }

    pub fn token_url(&self) -> String {
        let url = self.inner.url.as_ref();
        let realm = self.inner.realm.as_ref();
        format!("{url}/realms/{realm}/protocol/openid-connect/token")
    }

    /// Exchanges username and password for an access token (password grant).
    pub async fn acquire(
        &self,
        username: &str,
        password: &str,
    ) -> Result<KeycloakSessionToken, KeycloakSessionError> {
        let client_id = self.inner.client_id.as_ref();
        let result = error(
            self.inner
                .client
                .post(self.token_url())
                .form(&[
                    ("username", username),
                    ("password", password),
                    ("grant_type", "password"),
                    ("client_id", client_id),
                ])
                .send()
                .await?,
        )
        .await?
        .json::<serde_json::Value>()
        .await?;
        serde_json::from_value(result)
            .map(KeycloakSessionToken::parse_access_token)
            .map_err(|err| KeycloakSessionError::Decode(Arc::new(err)))
    }
}

struct KeycloakSessionInner {
    token: KeycloakSessionToken,
}

/// Admin session holding one bearer token for the lifetime of a run.
///
/// There is no refresh: a provisioning run finishes well within the
/// token lifetime and a fresh token is acquired on every invocation.
#[derive(Clone)]
pub struct KeycloakSession {
    inner: Arc<KeycloakSessionInner>,
}

impl KeycloakSession {
    pub async fn new(
        keycloak: &KeycloakSessionClient,
        username: &str,
        password: &str,
    ) -> Result<Self, KeycloakSessionError> {
        let token = keycloak.acquire(username, password).await.map_err(|e| {
            tracing::error!("{e:#?}");
            e
        })?;
        match token.claims() {
            Some(claims) => tracing::debug!(
                "admin token for {:?} (sub {:?}) issued by {:?}, expires at {:?}",
                claims.preferred_username(),
                claims.subject(),
                claims.issuer(),
                claims.expires_at()
            ),
            None => tracing::debug!("opaque admin token for {username}"),
        }
        Ok(KeycloakSession {
            inner: Arc::new(KeycloakSessionInner { token }),
        })
    }

    pub async fn from_config(
        config: &Config,
        client: reqwest::Client,
    ) -> Result<Self, KeycloakSessionError> {
        let session_client = KeycloakSessionClient::new(
            config.address(),
            config.admin_realm(),
            config.client_id(),
            client,
        );
        Self::new(&session_client, config.username(), config.password()).await
    }
}

#[async_trait::async_trait]
impl KeycloakTokenSupplier for KeycloakSession {
    async fn get(&self, _url: &str) -> Result<String, KeycloakError> {
        Ok(self.inner.token.access_token().to_string())
    }
}
