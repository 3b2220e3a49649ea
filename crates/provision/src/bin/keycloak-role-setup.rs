//! Creates the `merchant` realm role and maps it onto the merchant user.
use std::process::ExitCode;

use afm_keycloak::KeycloakConfig;
use afm_provision::{Reporter, setup, target::MERCHANT_ROLE};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    afm_provision::init_tracing();
    let mut reporter = Reporter::stdout();
    let result =
        setup::merchant_role(KeycloakConfig::compiled_in(), &MERCHANT_ROLE, &mut reporter).await;
    ExitCode::from(setup::exit_status(result, &mut reporter))
}
