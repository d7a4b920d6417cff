// crates/pcbook-rpc/src/client.rs
//
// Client-side call wrapper.
//
// `TokenRefresher` logs in once, then keeps a `SharedToken` fresh from a
// background task. `AuthChannel` wraps a transport channel and attaches the
// current token to every call whose method requires authentication.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use http::header::HeaderValue;
use thiserror::Error;
use tokio::task::JoinHandle;
use tonic::transport::{Certificate, Channel, ClientTlsConfig};
use tonic::Status;
use tower_service::Service;
use tracing::{debug, info, warn};

use crate::middleware::AUTHORIZATION;
use crate::proto::{AuthServiceClient, LoginRequest};

/// Errors raised while setting up a client connection.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server address: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("cannot read CA certificate: {0}")]
    Io(#[from] std::io::Error),

    #[error("RPC failed: {0}")]
    Status(#[from] Status),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

/// Open a channel to `server` (`host:port` or a full URL). When a CA
/// certificate is given the connection uses TLS and verifies the server
/// against it.
pub async fn connect(server: &str, ca_cert: Option<&Path>) -> Result<Channel, ClientError> {
    let url = if server.contains("://") {
        server.to_string()
    } else if ca_cert.is_some() {
        format!("https://{}", server)
    } else {
        format!("http://{}", server)
    };

    let mut endpoint = Channel::from_shared(url)?;
    if let Some(ca_path) = ca_cert {
        let pem = tokio::fs::read(ca_path).await?;
        endpoint = endpoint.tls_config(ClientTlsConfig::new().ca_certificate(Certificate::from_pem(pem)))?;
    }

    Ok(endpoint.connect().await?)
}

// ---------------------------------------------------------------------------
// AuthClient
// ---------------------------------------------------------------------------

/// Logs in to the AuthService with fixed credentials.
#[derive(Clone)]
pub struct AuthClient {
    client: AuthServiceClient<Channel>,
    username: String,
    password: String,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("username", &self.username)
            .finish()
    }
}

impl AuthClient {
    pub fn new(channel: Channel, username: &str, password: &str) -> Self {
        Self {
            client: AuthServiceClient::new(channel),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Log in and return a fresh access token.
    pub async fn login(&self) -> Result<String, Status> {
        let mut client = self.client.clone();
        let response = client
            .login(LoginRequest {
                username: self.username.clone(),
                password: self.password.clone(),
            })
            .await?;
        Ok(response.into_inner().access_token)
    }
}

/// Anything that can obtain a fresh access token.
#[async_trait]
pub trait TokenSource: Send + Sync + 'static {
    async fn fetch_token(&self) -> Result<String, Status>;
}

#[async_trait]
impl TokenSource for AuthClient {
    async fn fetch_token(&self) -> Result<String, Status> {
        self.login().await
    }
}

// ---------------------------------------------------------------------------
// SharedToken + TokenRefresher
// ---------------------------------------------------------------------------

/// The current access token, readable from any clone.
#[derive(Debug, Clone, Default)]
pub struct SharedToken(Arc<RwLock<String>>);

impl SharedToken {
    pub fn new(token: String) -> Self {
        Self(Arc::new(RwLock::new(token)))
    }

    pub fn get(&self) -> String {
        // A String is never left half-written, so a poisoned lock is still
        // safe to read.
        match self.0.read() {
            Ok(token) => token.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set(&self, token: String) {
        match self.0.write() {
            Ok(mut current) => *current = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }
}

/// Owns the background task that keeps a `SharedToken` fresh. Dropping the
/// refresher stops the task.
#[derive(Debug)]
pub struct TokenRefresher {
    token: SharedToken,
    task: JoinHandle<()>,
}

impl TokenRefresher {
    /// Log in once, then log in again every `refresh_interval`.
    ///
    /// The initial login must succeed. Later failures keep the previous
    /// token and are logged.
    pub async fn start<A: TokenSource>(
        auth: A,
        refresh_interval: Duration,
    ) -> Result<Self, ClientError> {
        if refresh_interval.is_zero() {
            return Err(ClientError::Config(
                "token refresh interval must be positive".to_string(),
            ));
        }

        let token = SharedToken::new(auth.fetch_token().await?);
        info!("Obtained access token, refreshing every {:?}", refresh_interval);

        let task = tokio::spawn(run_refresh_loop(auth, token.clone(), refresh_interval));
        Ok(Self { token, task })
    }

    pub fn token(&self) -> SharedToken {
        self.token.clone()
    }
}

impl Drop for TokenRefresher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Sole writer of the shared token.
async fn run_refresh_loop<A: TokenSource>(auth: A, token: SharedToken, refresh_interval: Duration) {
    let start = tokio::time::Instant::now() + refresh_interval;
    let mut interval = tokio::time::interval_at(start, refresh_interval);

    loop {
        interval.tick().await;

        match auth.fetch_token().await {
            Ok(fresh) => {
                token.set(fresh);
                debug!("Access token refreshed");
            }
            Err(status) => warn!("Cannot refresh access token: {}", status.message()),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthChannel
// ---------------------------------------------------------------------------

/// Transport wrapper attaching the current token to protected calls.
///
/// Calls to methods outside the configured set pass through unmodified.
#[derive(Debug, Clone)]
pub struct AuthChannel<S = Channel> {
    inner: S,
    token: SharedToken,
    methods: Arc<HashSet<String>>,
}

impl<S> AuthChannel<S> {
    pub fn new<I, M>(inner: S, token: SharedToken, methods: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        Self {
            inner,
            token,
            methods: Arc::new(methods.into_iter().map(Into::into).collect()),
        }
    }
}

impl<S, B> Service<http::Request<B>> for AuthChannel<S>
where
    S: Service<http::Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: http::Request<B>) -> Self::Future {
        if self.methods.contains(req.uri().path()) {
            match HeaderValue::from_str(&self.token.get()) {
                Ok(value) => {
                    req.headers_mut().insert(AUTHORIZATION, value);
                }
                Err(e) => warn!("Access token is not a valid header value: {}", e),
            }
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::future::{ready, Ready};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Inner service that reports the authorization header it saw.
    #[derive(Clone)]
    struct Echo;

    impl Service<http::Request<()>> for Echo {
        type Response = Option<String>;
        type Error = Infallible;
        type Future = Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<()>) -> Self::Future {
            let header = req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            ready(Ok(header))
        }
    }

    fn request(path: &str) -> http::Request<()> {
        http::Request::builder().uri(path).body(()).unwrap()
    }

    #[tokio::test]
    async fn test_token_attached_only_to_protected_methods() {
        let token = SharedToken::new("t1".to_string());
        let mut channel = AuthChannel::new(Echo, token.clone(), ["/svc/Create"]);

        let seen = channel.call(request("/svc/Create")).await.unwrap();
        assert_eq!(seen.as_deref(), Some("t1"));

        let seen = channel.call(request("/svc/Search")).await.unwrap();
        assert!(seen.is_none());
    }

    #[tokio::test]
    async fn test_channel_sees_refreshed_token() {
        let token = SharedToken::new("old".to_string());
        let mut channel = AuthChannel::new(Echo, token.clone(), ["/svc/Create"]);

        token.set("new".to_string());
        let seen = channel.call(request("/svc/Create")).await.unwrap();
        assert_eq!(seen.as_deref(), Some("new"));
    }

    #[test]
    fn test_shared_token_clones_share_state() {
        let token = SharedToken::new("a".to_string());
        let clone = token.clone();
        token.set("b".to_string());
        assert_eq!(clone.get(), "b");
    }

    /// Hands out `token-0`, `token-1`, ... and fails while `down` is set.
    struct CountingSource {
        issued: AtomicUsize,
        down: Arc<AtomicBool>,
    }

    impl CountingSource {
        fn new(down: Arc<AtomicBool>) -> Self {
            Self {
                issued: AtomicUsize::new(0),
                down,
            }
        }
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn fetch_token(&self) -> Result<String, Status> {
            if self.down.load(Ordering::SeqCst) {
                return Err(Status::unavailable("auth server is down"));
            }
            let n = self.issued.fetch_add(1, Ordering::SeqCst);
            Ok(format!("token-{}", n))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresher_replaces_token_every_interval() {
        let down = Arc::new(AtomicBool::new(false));
        let refresher = TokenRefresher::start(CountingSource::new(down), Duration::from_secs(30))
            .await
            .unwrap();
        let token = refresher.token();
        assert_eq!(token.get(), "token-0");

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(token.get(), "token-0");

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(token.get(), "token-1");

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(token.get(), "token-2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_last_token() {
        let down = Arc::new(AtomicBool::new(false));
        let refresher =
            TokenRefresher::start(CountingSource::new(down.clone()), Duration::from_secs(30))
                .await
                .unwrap();
        let token = refresher.token();

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(token.get(), "token-1");

        down.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(token.get(), "token-1");

        down.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(token.get(), "token-2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_fetch_failure_is_returned() {
        let down = Arc::new(AtomicBool::new(true));
        let err = TokenRefresher::start(CountingSource::new(down), Duration::from_secs(30))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Status(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_refresher_stops_refreshes() {
        let down = Arc::new(AtomicBool::new(false));
        let refresher = TokenRefresher::start(CountingSource::new(down), Duration::from_secs(30))
            .await
            .unwrap();
        let token = refresher.token();
        drop(refresher);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(token.get(), "token-0");
    }
}
