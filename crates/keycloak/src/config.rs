use std::sync::Arc;

const DEFAULT_ADDRESS: &str = "http://localhost:8080";
const DEFAULT_ADMIN_REALM: &str = "master";
const DEFAULT_CLIENT_ID: &str = "admin-cli";
const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin123";
const DEFAULT_REALM: &str = "afromarket";
const DEFAULT_APP_URL: &str = "http://localhost:3000";

#[derive(Default)]
pub struct ConfigBuilder<'a> {
    prefix: Option<&'a str>,
    address: Option<&'a str>,
}

impl<'a> ConfigBuilder<'a> {
    pub fn with_prefix(mut self, prefix: &'a str) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Overrides whatever address the environment provides.
    pub fn with_address(mut self, address: &'a str) -> Self {
        self.address = Some(address);
        self
    }

    pub fn build(self) -> envy::Result<Config> {
        let mut cfg: Config = if let Some(prefix) = self.prefix {
            envy::prefixed(prefix)
        } else {
            envy::prefixed("KEYCLOAK_")
        }
        .from_env()?;
        if let Some(address) = self.address {
            cfg.address = Some(Arc::from(address));
        }
        Ok(cfg.with_defaults())
    }
}

/// Connection and admin credentials for the Keycloak server.
///
/// [`Config::compiled_in`] never looks at the environment and yields
/// `admin`/`admin123` against `http://localhost:8080` and the
/// `afromarket` realm. The envy builder fills unset fields with the
/// same values.
#[derive(Clone, Default, serde::Deserialize, Debug)]
pub struct Config {
    address: Option<Arc<str>>,
    host: Option<Arc<str>>,
    port: Option<u16>,
    admin_realm: Option<Arc<str>>,
    client_id: Option<Arc<str>>,
    username: Option<Arc<str>>,
    password: Option<Arc<str>>,
    realm: Option<Arc<str>>,
    app_url: Option<Arc<str>>,
}

impl Config {
    /// Configuration built from the compiled-in constants only.
    pub fn compiled_in() -> Self {
        Self::default().with_defaults()
    }

    /// Replaces the server address, e.g. to target a local test server.
    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Some(Arc::from(address.trim_end_matches('/')));
        self
    }

    fn with_defaults(mut self) -> Self {
        if self.address.is_none() {
            self.address = match (self.host.as_deref(), self.port) {
                (None, None) => Some(Arc::from(DEFAULT_ADDRESS)),
                (host, port) => Some(Arc::from(format!(
                    "http://{}:{}",
                    host.unwrap_or("localhost"),
                    port.unwrap_or(8080)
                ))),
            };
        }
        if let Some(address) = self.address.take() {
            self.address = Some(Arc::from(address.trim_end_matches('/')));
        }
        if self.admin_realm.is_none() {
            self.admin_realm = Some(DEFAULT_ADMIN_REALM.into());
        }
        if self.client_id.is_none() {
            self.client_id = Some(DEFAULT_CLIENT_ID.into());
        }
        if self.username.is_none() {
            self.username = Some(DEFAULT_USERNAME.into());
        }
        if self.password.is_none() {
            self.password = Some(DEFAULT_PASSWORD.into());
        }
        if self.realm.is_none() {
            self.realm = Some(DEFAULT_REALM.into());
        }
        if self.app_url.is_none() {
            self.app_url = Some(DEFAULT_APP_URL.into());
        }
        self
    }

    pub fn new() -> envy::Result<Self> {
        ConfigBuilder::default().build()
    }

    pub fn builder<'a>() -> ConfigBuilder<'a> {
        ConfigBuilder::default()
    }

    pub fn address(&self) -> &str {
        self.address.as_deref().unwrap_or(DEFAULT_ADDRESS)
    }

    /// Realm the admin account lives in, used for the token endpoint.
    pub fn admin_realm(&self) -> &str {
        self.admin_realm.as_deref().unwrap_or(DEFAULT_ADMIN_REALM)
    }

    pub fn client_id(&self) -> &str {
        self.client_id.as_deref().unwrap_or(DEFAULT_CLIENT_ID)
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(DEFAULT_USERNAME)
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or(DEFAULT_PASSWORD)
    }

    /// Realm that gets provisioned.
    pub fn realm(&self) -> &str {
        self.realm.as_deref().unwrap_or(DEFAULT_REALM)
    }

    pub fn app_url(&self) -> &str {
        self.app_url.as_deref().unwrap_or(DEFAULT_APP_URL)
    }
}
