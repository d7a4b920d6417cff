// crates/pcbook-cli/src/commands/create.rs
//
// `pcbook create`: create random sample laptops on the server.

use clap::Args;
use tonic::transport::Channel;

use pcbook_core::laptop::Laptop;
use pcbook_core::sample;
use pcbook_rpc::proto::{CreateLaptopRequest, LaptopServiceClient};
use pcbook_rpc::AuthChannel;

use crate::config::Settings;
use crate::session::Session;

#[derive(Debug, Args)]
pub struct CreateCmd {
    /// Number of laptops to create.
    #[arg(long, default_value = "10")]
    pub count: usize,
}

/// Create one laptop and return the id the server assigned.
pub async fn create_laptop(
    client: &mut LaptopServiceClient<AuthChannel<Channel>>,
    laptop: Laptop,
) -> Result<String, tonic::Status> {
    let response = client
        .create_laptop(CreateLaptopRequest {
            laptop: Some(laptop),
        })
        .await?;
    let id = response.into_inner().id;
    tracing::info!("created laptop with id: {}", id);
    Ok(id)
}

/// Create `count` sample laptops and return their ids.
pub async fn create_samples(
    client: &mut LaptopServiceClient<AuthChannel<Channel>>,
    count: usize,
) -> Result<Vec<String>, tonic::Status> {
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        ids.push(create_laptop(client, sample::new_laptop()).await?);
    }
    Ok(ids)
}

pub async fn run(cmd: &CreateCmd, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(settings).await?;
    let ids = create_samples(&mut session.laptops, cmd.count).await?;
    for id in &ids {
        println!("{}", id);
    }
    Ok(())
}
