//! Creates the regular AfroMarket test user, or resets its password when
//! it already exists.
use std::process::ExitCode;

use afm_keycloak::KeycloakConfig;
use afm_provision::{Reporter, setup, target::REGULAR_USER};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    afm_provision::init_tracing();
    let mut reporter = Reporter::stdout();
    let result =
        setup::regular_user(KeycloakConfig::compiled_in(), &REGULAR_USER, &mut reporter).await;
    ExitCode::from(setup::exit_status(result, &mut reporter))
}
