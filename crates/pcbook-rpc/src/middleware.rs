// crates/pcbook-rpc/src/middleware.rs
//
// Middleware for the RPC server: the authorization layer wrapping every
// route, and a per-service logging interceptor.
//
// Authorization runs as a tower layer rather than a tonic interceptor
// because it needs the method path, which tonic interceptors never see.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use http_body_util::BodyExt;
use tonic::body::BoxBody;
use tonic::{Request, Status};
use tower::Layer;
use tower_service::Service;

use pcbook_core::access::AccessPolicy;
use pcbook_core::token::{TokenManager, UserClaims};

use crate::handlers::log_status;

/// Metadata key carrying the access token.
pub const AUTHORIZATION: &str = "authorization";

/// Logging interceptor for tonic gRPC requests.
///
/// Logs the caller's user agent and whether the call carries a token, never
/// the token itself.
pub fn logging_interceptor(req: Request<()>) -> Result<Request<()>, Status> {
    let user_agent = req
        .metadata()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::info!(
        user_agent,
        authenticated = req.metadata().contains_key(AUTHORIZATION),
        "Incoming RPC request"
    );
    Ok(req)
}

/// Decide whether a call to `method` may proceed.
///
/// Returns the verified claims for protected methods, `None` for public
/// ones. The token may be sent bare or as `Bearer <token>`.
pub fn authorize(
    tokens: &TokenManager,
    policy: &AccessPolicy,
    method: &str,
    headers: &HeaderMap,
) -> Result<Option<UserClaims>, Status> {
    let Some(allowed) = policy.allowed_roles(method) else {
        return Ok(None);
    };

    let token = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Status::unauthenticated("authorization token is not provided"))?
        .to_str()
        .map_err(|_| Status::unauthenticated("authorization token is not valid text"))?;
    let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();

    let claims = tokens
        .verify(token)
        .map_err(|e| Status::unauthenticated(format!("access token is invalid: {}", e)))?;

    if !allowed.iter().any(|role| *role == claims.role) {
        return Err(Status::permission_denied(
            "no permission to access this RPC",
        ));
    }

    Ok(Some(claims))
}

/// Layer installing `AuthMiddleware` around every route of a server.
#[derive(Debug, Clone)]
pub struct AuthLayer {
    tokens: Arc<TokenManager>,
    policy: Arc<AccessPolicy>,
}

impl AuthLayer {
    pub fn new(tokens: Arc<TokenManager>, policy: Arc<AccessPolicy>) -> Self {
        Self { tokens, policy }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            tokens: self.tokens.clone(),
            policy: self.policy.clone(),
        }
    }
}

/// Checks every inbound call against the access policy before it reaches a
/// service. Unary and streaming calls are checked identically, once, when
/// the call is set up. Verified claims are placed in the request extensions.
#[derive(Debug, Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    tokens: Arc<TokenManager>,
    policy: Arc<AccessPolicy>,
}

impl<S, B> Service<http::Request<B>> for AuthMiddleware<S>
where
    S: Service<http::Request<B>, Response = http::Response<BoxBody>>,
    S::Future: Send + 'static,
{
    type Response = http::Response<BoxBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: http::Request<B>) -> Self::Future {
        let method = req.uri().path().to_string();
        match authorize(&self.tokens, &self.policy, &method, req.headers()) {
            Ok(claims) => {
                if let Some(claims) = claims {
                    tracing::debug!("{} authorized for {} as {}", method, claims.sub, claims.role);
                    req.extensions_mut().insert(claims);
                }
                Box::pin(self.inner.call(req))
            }
            Err(status) => {
                let response = status_response(log_status(status));
                Box::pin(async move { Ok(response) })
            }
        }
    }
}

/// A trailers-only gRPC response carrying `status`.
fn status_response(status: Status) -> http::Response<BoxBody> {
    let body = BoxBody::new(
        http_body_util::Empty::<Bytes>::new()
            .map_err(|e| Status::internal(format!("body error: {}", e))),
    );

    let mut response = http::Response::new(body);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/grpc"));
    if let Err(e) = status.add_header(response.headers_mut()) {
        tracing::error!("Failed to encode status headers: {}", e);
    }
    response
}
