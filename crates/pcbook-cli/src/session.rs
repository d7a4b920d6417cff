// crates/pcbook-cli/src/session.rs
//
// An authenticated connection to the pcbook server.

use pcbook_rpc::client::{self, AuthChannel, AuthClient, TokenRefresher};
use pcbook_rpc::proto::LaptopServiceClient;
use pcbook_rpc::{access_policy, ClientError};

use crate::config::Settings;

/// A laptop client whose protected calls carry a token that is refreshed in
/// the background for as long as the session lives.
pub struct Session {
    pub laptops: LaptopServiceClient<AuthChannel>,
    _refresher: TokenRefresher,
}

impl Session {
    pub async fn open(settings: &Settings) -> Result<Self, ClientError> {
        let channel = client::connect(&settings.server, settings.ca_cert.as_deref()).await?;

        let auth = AuthClient::new(channel.clone(), &settings.username, &settings.password);
        let refresher = TokenRefresher::start(auth, settings.refresh_interval).await?;

        let policy = access_policy();
        let channel = AuthChannel::new(channel, refresher.token(), policy.protected_methods());

        Ok(Self {
            laptops: LaptopServiceClient::new(channel),
            _refresher: refresher,
        })
    }
}
