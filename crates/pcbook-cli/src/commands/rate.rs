// crates/pcbook-cli/src/commands/rate.rs
//
// `pcbook rate`: rate laptops over one bidirectional stream and print the
// running averages the server reports back.

use clap::Args;
use tokio_stream::StreamExt;

use pcbook_core::sample;
use pcbook_rpc::proto::RateLaptopRequest;

use crate::commands::create::create_samples;
use crate::config::Settings;
use crate::session::Session;

/// Laptops created when no ids are given.
const DEFAULT_LAPTOPS: usize = 3;

#[derive(Debug, Args)]
pub struct RateCmd {
    /// Laptop to rate. Repeat to rate several.
    #[arg(long = "laptop-id")]
    pub laptop_ids: Vec<String>,

    /// How many times each laptop is rated.
    #[arg(long, default_value = "1")]
    pub rounds: usize,
}

/// One random score per laptop per round, in round order.
pub fn rating_requests(laptop_ids: &[String], rounds: usize) -> Vec<RateLaptopRequest> {
    (0..rounds)
        .flat_map(|_| {
            laptop_ids.iter().map(|id| RateLaptopRequest {
                laptop_id: id.clone(),
                score: sample::random_score(),
            })
        })
        .collect()
}

pub async fn run(cmd: &RateCmd, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(settings).await?;

    let laptop_ids = if cmd.laptop_ids.is_empty() {
        create_samples(&mut session.laptops, DEFAULT_LAPTOPS).await?
    } else {
        cmd.laptop_ids.clone()
    };

    let requests = rating_requests(&laptop_ids, cmd.rounds);
    for request in &requests {
        tracing::debug!("rating laptop {} with {}", request.laptop_id, request.score);
    }

    let mut responses = session
        .laptops
        .rate_laptop(tokio_stream::iter(requests))
        .await?
        .into_inner();

    while let Some(response) = responses.next().await {
        let response = response?;
        println!(
            "laptop {}: rated {} times, average {:.2}",
            response.laptop_id, response.rated_count, response.average_score
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_requests() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let requests = rating_requests(&ids, 3);
        assert_eq!(requests.len(), 6);
        assert_eq!(requests[0].laptop_id, "a");
        assert_eq!(requests[1].laptop_id, "b");
        assert_eq!(requests[2].laptop_id, "a");
        assert!(requests.iter().all(|r| (1.0..=10.0).contains(&r.score)));
    }

    #[test]
    fn test_zero_rounds() {
        let ids = vec!["a".to_string()];
        assert!(rating_requests(&ids, 0).is_empty());
    }
}
