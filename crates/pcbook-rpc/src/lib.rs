// crates/pcbook-rpc/src/lib.rs
//
// pcbook-rpc: gRPC services for the pcbook laptop catalog.
//
// Provides the wire messages and generated service plumbing, the
// LaptopService and AuthService handlers, the authorization layer that
// gates every call, the server builder, and the client-side wrapper that
// logs in and attaches tokens to outbound calls.

pub mod client;
pub mod handlers;
pub mod middleware;
pub mod proto;
pub mod server;

// Re-export the main entry points for ergonomic access.
pub use client::{AuthChannel, AuthClient, ClientError, SharedToken, TokenRefresher, TokenSource};
pub use handlers::{AuthServer, LaptopServer};
pub use middleware::{AuthLayer, AuthMiddleware};
pub use server::{access_policy, PcbookRpcServer, RpcConfig, TlsConfig};
