//! Opens a Breeze session and prints the account's funds.
//!
//! ```sh
//! BREEZE_APP_KEY=... BREEZE_APP_SECRET=... cargo run --example session -- <session-key>
//! ```
//!
//! Without a session key the example prints the login URL to obtain one and exits.

use std::env;

use breeze_connect::{BreezeClient, ClientConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ClientConfig::builder()
        .app_key(env::var("BREEZE_APP_KEY")?)
        .app_secret(env::var("BREEZE_APP_SECRET")?)
        .build()?;
    let client = BreezeClient::new(config)?;

    let Some(session_key) = env::args().nth(1) else {
        info!(login_url = %client.login_url()?, "log in and pass the session key");
        return Ok(());
    };

    let details = client.bootstrap(session_key).await?.into_result()?;
    info!(user = %details.user_name, "session ready");

    match client.funds().await?.into_result() {
        Ok(funds) => {
            info!(
                bank_account = %funds.bank_account,
                total = %funds.total_bank_balance,
                unallocated = %funds.unallocated_balance,
                "funds"
            );
        }
        Err(e) => error!("funds request failed: {e}"),
    }

    Ok(())
}
