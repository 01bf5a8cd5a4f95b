use anyhow::Context;

use materials_infra::{AuthClient, MaterialsConfig, SessionHandle, SignUpOutcome};

pub async fn run(
    config: &MaterialsConfig,
    email: &str,
    password: Option<&str>,
    full_name: Option<&str>,
) -> anyhow::Result<()> {
    let password = password.context("sign-up needs --password or MATERIALS_PASSWORD")?;
    let http = config.http_client().context("building HTTP client")?;
    let auth = AuthClient::new(config, http, SessionHandle::new());

    match auth.sign_up(email, password, full_name).await? {
        SignUpOutcome::SignedIn(principal) => {
            println!("account created for {}", principal.email.as_deref().unwrap_or(email));
            let _ = auth.sign_out().await;
        }
        SignUpOutcome::ConfirmationRequired => {
            println!("account created; confirm the address sent to {email} before signing in");
        }
    }
    Ok(())
}
