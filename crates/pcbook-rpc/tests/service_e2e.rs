// crates/pcbook-rpc/tests/service_e2e.rs
//
// End-to-end tests for the pcbook services.
//
// Each test starts a real tonic server on 127.0.0.1:0 with in-memory stores
// and drives it through the generated clients, going through the same
// authorization layer and client call wrapper as production.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::net::TcpListener;
use tonic::transport::Channel;
use tonic::Code;
use uuid::Uuid;

use pcbook_core::laptop::Laptop;
use pcbook_core::sample;
use pcbook_core::token::TokenManager;
use pcbook_core::traits::{LaptopStore, UserStore};
use pcbook_core::user::User;
use pcbook_rpc::client::{self, AuthChannel, AuthClient, SharedToken, TokenRefresher};
use pcbook_rpc::handlers::laptop::MAX_IMAGE_SIZE;
use pcbook_rpc::proto::{
    AuthServiceClient, CreateLaptopRequest, LaptopServiceClient, LoginRequest, RateLaptopRequest,
    SearchLaptopRequest, UploadImageRequest,
};
use pcbook_rpc::{access_policy, PcbookRpcServer, RpcConfig};
use pcbook_store::{DiskImageStore, InMemoryLaptopStore, InMemoryRatingStore, InMemoryUserStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct TestServer {
    addr: SocketAddr,
    laptops: Arc<InMemoryLaptopStore>,
    tokens: Arc<TokenManager>,
    image_dir: TempDir,
}

/// Bind to port 0, seed two users, spawn the server and return its handles.
async fn start_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let image_dir = tempfile::tempdir().unwrap();
    let laptops = Arc::new(InMemoryLaptopStore::new());
    let images = Arc::new(DiskImageStore::new(image_dir.path()).await.unwrap());
    let ratings = Arc::new(InMemoryRatingStore::new());
    let users = Arc::new(InMemoryUserStore::new());
    users.save(&User::new("admin1", "secret", "admin").unwrap()).await.unwrap();
    users.save(&User::new("user1", "secret", "user").unwrap()).await.unwrap();
    let tokens = Arc::new(TokenManager::new("secret", chrono::Duration::minutes(15)).unwrap());

    let server = PcbookRpcServer::new(
        RpcConfig::default(),
        laptops.clone(),
        images,
        ratings,
        users,
        tokens.clone(),
    );
    tokio::spawn(async move {
        server.serve(listener).await.unwrap();
    });

    TestServer {
        addr,
        laptops,
        tokens,
        image_dir,
    }
}

async fn channel(addr: SocketAddr) -> Channel {
    client::connect(&addr.to_string(), None).await.unwrap()
}

/// A laptop client that logs in as `username` and attaches its token.
async fn laptop_client(
    addr: SocketAddr,
    username: &str,
) -> (LaptopServiceClient<AuthChannel>, TokenRefresher) {
    let channel = channel(addr).await;
    let auth = AuthClient::new(channel.clone(), username, "secret");
    let refresher = TokenRefresher::start(auth, Duration::from_secs(30))
        .await
        .unwrap();
    let methods: Vec<String> = access_policy()
        .protected_methods()
        .map(str::to_string)
        .collect();
    let client = LaptopServiceClient::new(AuthChannel::new(channel, refresher.token(), methods));
    (client, refresher)
}

/// A laptop client that sends a fixed token.
async fn client_with_token(addr: SocketAddr, token: &str) -> LaptopServiceClient<AuthChannel> {
    let methods: Vec<String> = access_policy()
        .protected_methods()
        .map(str::to_string)
        .collect();
    LaptopServiceClient::new(AuthChannel::new(
        channel(addr).await,
        SharedToken::new(token.to_string()),
        methods,
    ))
}

fn create_request(laptop: Laptop) -> CreateLaptopRequest {
    CreateLaptopRequest {
        laptop: Some(laptop),
    }
}

// ---------------------------------------------------------------------------
// Create + auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_laptop_end_to_end() {
    let server = start_server().await;
    let (mut client, _refresher) = laptop_client(server.addr, "admin1").await;

    let laptop = Laptop {
        brand: "Dell".to_string(),
        ..Default::default()
    };
    let id = client
        .create_laptop(create_request(laptop))
        .await
        .unwrap()
        .into_inner()
        .id;
    assert!(Uuid::parse_str(&id).is_ok());

    let stored = server.laptops.find(&id).await.unwrap().unwrap();
    assert_eq!(stored.brand, "Dell");

    let duplicate = Laptop {
        id: id.clone(),
        brand: "Lenovo".to_string(),
        ..Default::default()
    };
    let status = client
        .create_laptop(create_request(duplicate))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::AlreadyExists);
    assert_eq!(server.laptops.find(&id).await.unwrap().unwrap().brand, "Dell");
}

#[tokio::test]
async fn create_with_invalid_id_is_rejected() {
    let server = start_server().await;
    let (mut client, _refresher) = laptop_client(server.addr, "admin1").await;

    let mut laptop = sample::new_laptop();
    laptop.id = "not-a-uuid".to_string();
    let status = client.create_laptop(create_request(laptop)).await.unwrap_err();

    assert_eq!(status.code(), Code::InvalidArgument);
    assert!(server.laptops.is_empty().unwrap());
}

#[tokio::test]
async fn create_without_token_is_unauthenticated() {
    let server = start_server().await;
    let mut client = LaptopServiceClient::new(channel(server.addr).await);

    let status = client
        .create_laptop(create_request(sample::new_laptop()))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
    assert!(server.laptops.is_empty().unwrap());
}

#[tokio::test]
async fn create_as_user_is_permission_denied() {
    let server = start_server().await;
    let (mut client, _refresher) = laptop_client(server.addr, "user1").await;

    let status = client
        .create_laptop(create_request(sample::new_laptop()))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);
}

#[tokio::test]
async fn expired_token_is_unauthenticated() {
    let server = start_server().await;
    let expired = server
        .tokens
        .issue_at("admin1", "admin", chrono::Utc::now() - chrono::Duration::hours(1))
        .unwrap();
    let mut client = client_with_token(server.addr, &expired).await;

    let status = client
        .create_laptop(create_request(sample::new_laptop()))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
}

#[tokio::test]
async fn login_with_wrong_password_is_not_found() {
    let server = start_server().await;
    let mut auth = AuthServiceClient::new(channel(server.addr).await);

    let status = auth
        .login(LoginRequest {
            username: "admin1".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
}

#[tokio::test]
async fn refresher_fails_on_bad_credentials() {
    let server = start_server().await;
    let auth = AuthClient::new(channel(server.addr).await, "ghost", "secret");
    assert!(TokenRefresher::start(auth, Duration::from_secs(30)).await.is_err());
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_is_public_and_streams_matches() {
    let server = start_server().await;

    let mut expected = Vec::new();
    for _ in 0..10 {
        let laptop = sample::new_laptop();
        if sample::new_filter().matches(&laptop) {
            expected.push(laptop.id.clone());
        }
        server.laptops.save(&laptop).await.unwrap();
    }

    let mut client = LaptopServiceClient::new(channel(server.addr).await);
    let mut stream = client
        .search_laptop(SearchLaptopRequest {
            filter: Some(sample::new_filter()),
        })
        .await
        .unwrap()
        .into_inner();

    let mut found = Vec::new();
    while let Some(response) = stream.message().await.unwrap() {
        let laptop = response.laptop.unwrap();
        assert!(sample::new_filter().matches(&laptop));
        found.push(laptop.id);
    }

    found.sort();
    expected.sort();
    assert_eq!(found, expected);
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_image_end_to_end() {
    let server = start_server().await;
    let laptop = sample::new_laptop();
    server.laptops.save(&laptop).await.unwrap();
    let (mut client, _refresher) = laptop_client(server.addr, "admin1").await;

    let mut messages = vec![UploadImageRequest::info(&laptop.id, ".jpg")];
    for _ in 0..5 {
        messages.push(UploadImageRequest::chunk(vec![7; 1024]));
    }

    let response = client
        .upload_image(tokio_stream::iter(messages))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.size, 5 * 1024);
    let path = server
        .image_dir
        .path()
        .join(format!("{}.jpg", response.id));
    assert_eq!(std::fs::read(path).unwrap().len(), 5 * 1024);
}

#[tokio::test]
async fn upload_too_large_is_rejected() {
    let server = start_server().await;
    let laptop = sample::new_laptop();
    server.laptops.save(&laptop).await.unwrap();
    let (mut client, _refresher) = laptop_client(server.addr, "admin1").await;

    let messages = vec![
        UploadImageRequest::info(&laptop.id, ".jpg"),
        UploadImageRequest::chunk(vec![0; MAX_IMAGE_SIZE / 2]),
        UploadImageRequest::chunk(vec![0; MAX_IMAGE_SIZE / 2]),
        UploadImageRequest::chunk(vec![0; 1]),
    ];
    let status = client
        .upload_image(tokio_stream::iter(messages))
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(std::fs::read_dir(server.image_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn upload_as_user_is_permission_denied() {
    let server = start_server().await;
    let laptop = sample::new_laptop();
    server.laptops.save(&laptop).await.unwrap();
    let (mut client, _refresher) = laptop_client(server.addr, "user1").await;

    let messages = vec![
        UploadImageRequest::info(&laptop.id, ".jpg"),
        UploadImageRequest::chunk(vec![1, 2, 3]),
    ];
    let status = client
        .upload_image(tokio_stream::iter(messages))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);
}

// ---------------------------------------------------------------------------
// Rate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rate_laptops_over_one_stream() {
    let server = start_server().await;
    let laptops: Vec<Laptop> = (0..3).map(|_| sample::new_laptop()).collect();
    for laptop in &laptops {
        server.laptops.save(laptop).await.unwrap();
    }
    let (mut client, _refresher) = laptop_client(server.addr, "user1").await;

    let scores = [8.0, 6.0, 4.0];
    let mut requests = Vec::new();
    for round in 0..2 {
        for (laptop, score) in laptops.iter().zip(scores) {
            requests.push(RateLaptopRequest {
                laptop_id: laptop.id.clone(),
                score: score + round as f64,
            });
        }
    }

    let mut responses = client
        .rate_laptop(tokio_stream::iter(requests))
        .await
        .unwrap()
        .into_inner();

    let mut received = Vec::new();
    while let Some(response) = responses.message().await.unwrap() {
        received.push(response);
    }

    assert_eq!(received.len(), 6);
    for (i, laptop) in laptops.iter().enumerate() {
        let last = &received[3 + i];
        assert_eq!(last.laptop_id, laptop.id);
        assert_eq!(last.rated_count, 2);
        assert!((last.average_score - (scores[i] + 0.5)).abs() < 1e-9);
    }
}

#[tokio::test]
async fn rate_unknown_laptop_is_not_found() {
    let server = start_server().await;
    let (mut client, _refresher) = laptop_client(server.addr, "admin1").await;

    let requests = vec![RateLaptopRequest {
        laptop_id: sample::random_id(),
        score: 5.0,
    }];
    let mut responses = client
        .rate_laptop(tokio_stream::iter(requests))
        .await
        .unwrap()
        .into_inner();

    let status = responses.message().await.unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
}
