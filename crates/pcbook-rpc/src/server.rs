// crates/pcbook-rpc/src/server.rs
//
// RPC server setup: PcbookRpcServer, RpcConfig and the default access
// policy.
//
// Both services share one tonic server. The authorization layer wraps every
// route; each service additionally gets the logging interceptor.

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::{Certificate, Identity, Server, ServerTlsConfig};

use pcbook_core::access::AccessPolicy;
use pcbook_core::token::TokenManager;
use pcbook_core::traits::{ImageStore, LaptopStore, RatingStore, UserStore};

use crate::handlers::{AuthServer, LaptopServer};
use crate::middleware::{self, AuthLayer};
use crate::proto::{methods, AuthServiceServer, LaptopServiceServer};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Host to bind to (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,
    /// Port to listen on. Zero picks a free port.
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// PEM files for serving over TLS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Server certificate chain.
    pub cert_path: PathBuf,
    /// Server private key.
    pub key_path: PathBuf,
    /// CA used to verify client certificates. Setting it turns on mutual TLS.
    #[serde(default)]
    pub client_ca_path: Option<PathBuf>,
}

impl TlsConfig {
    /// Read the PEM files and build tonic's TLS settings.
    pub fn load(&self) -> Result<ServerTlsConfig, std::io::Error> {
        let cert = std::fs::read(&self.cert_path)?;
        let key = std::fs::read(&self.key_path)?;
        let mut tls = ServerTlsConfig::new().identity(Identity::from_pem(cert, key));

        if let Some(ca_path) = &self.client_ca_path {
            let ca = std::fs::read(ca_path)?;
            tls = tls.client_ca_root(Certificate::from_pem(ca));
        }

        Ok(tls)
    }
}

/// Role names used by the default policy.
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Which roles may call which method. Search and login are public.
pub fn access_policy() -> AccessPolicy {
    AccessPolicy::new()
        .allow(methods::CREATE_LAPTOP, [ROLE_ADMIN])
        .allow(methods::UPLOAD_IMAGE, [ROLE_ADMIN])
        .allow(methods::RATE_LAPTOP, [ROLE_ADMIN, ROLE_USER])
}

// ---------------------------------------------------------------------------
// PcbookRpcServer
// ---------------------------------------------------------------------------

/// The RPC server for the pcbook catalog.
///
/// Holds the service handlers plus everything the authorization layer
/// needs, and serves them on a TCP listener.
#[derive(Clone)]
pub struct PcbookRpcServer {
    config: RpcConfig,
    laptop_server: LaptopServer,
    auth_server: AuthServer,
    tokens: Arc<TokenManager>,
    policy: Arc<AccessPolicy>,
    tls: Option<ServerTlsConfig>,
}

impl std::fmt::Debug for PcbookRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PcbookRpcServer")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .field("tls", &self.tls.is_some())
            .finish()
    }
}

impl PcbookRpcServer {
    /// Create a server over the given stores, guarded by `access_policy()`.
    pub fn new(
        config: RpcConfig,
        laptops: Arc<dyn LaptopStore>,
        images: Arc<dyn ImageStore>,
        ratings: Arc<dyn RatingStore>,
        users: Arc<dyn UserStore>,
        tokens: Arc<TokenManager>,
    ) -> Self {
        Self {
            config,
            laptop_server: LaptopServer::new(laptops, images, ratings),
            auth_server: AuthServer::new(users, tokens.clone()),
            tokens,
            policy: Arc::new(access_policy()),
            tls: None,
        }
    }

    /// Replace the access policy.
    pub fn with_access_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Serve over TLS.
    pub fn with_tls(mut self, tls: ServerTlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!(
            "pcbook RPC server starting on {} (tls: {})",
            listener.local_addr()?,
            self.tls.is_some()
        );

        self.serve_with_shutdown(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

        Ok(())
    }

    /// Serve on an already bound listener until the process ends.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), tonic::transport::Error> {
        self.serve_with_shutdown(listener, std::future::pending()).await
    }

    /// Serve on an already bound listener until `signal` resolves.
    pub async fn serve_with_shutdown<F>(
        &self,
        listener: TcpListener,
        signal: F,
    ) -> Result<(), tonic::transport::Error>
    where
        F: Future<Output = ()>,
    {
        let mut builder = Server::builder();
        if let Some(tls) = &self.tls {
            builder = builder.tls_config(tls.clone())?;
        }

        builder
            .layer(AuthLayer::new(self.tokens.clone(), self.policy.clone()))
            .add_service(InterceptedService::new(
                LaptopServiceServer::new(self.laptop_server.clone()),
                middleware::logging_interceptor,
            ))
            .add_service(InterceptedService::new(
                AuthServiceServer::new(self.auth_server.clone()),
                middleware::logging_interceptor,
            ))
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), signal)
            .await
    }
}
