// crates/pcbook-cli/src/commands/login.rs
//
// `pcbook login`: log in and print the access token.

use pcbook_rpc::client::{self, AuthClient};

use crate::config::Settings;

pub async fn run(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let channel = client::connect(&settings.server, settings.ca_cert.as_deref()).await?;
    let auth = AuthClient::new(channel, &settings.username, &settings.password);
    let token = auth.login().await?;
    println!("{}", token);
    Ok(())
}
