//! # provision
//!
//! Idempotent provisioning of the AfroMarket Keycloak realm.
//!
//! Two workflows live here, each a short sequence of admin calls:
//!
//! * [`setup::regular_user`] makes sure the regular test user exists with
//!   a known password.
//! * [`setup::merchant_role`] makes sure the `merchant` realm role exists
//!   and is mapped to the merchant user.
//!
//! Both converge to the same end state no matter how often they run.
pub mod error;
pub mod report;
pub mod role;
pub mod setup;
pub mod target;
pub mod user;

pub use error::ProvisionError;
pub use report::Reporter;

/// Installs the stderr log subscriber used by the binaries.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
