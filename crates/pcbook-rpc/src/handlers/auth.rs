// crates/pcbook-rpc/src/handlers/auth.rs
//
// AuthService: exchange a username and password for an access token.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::info;

use pcbook_core::token::TokenManager;
use pcbook_core::traits::UserStore;

use super::log_status;
use crate::proto::{AuthService, LoginRequest, LoginResponse};

#[derive(Clone)]
pub struct AuthServer {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenManager>,
}

impl std::fmt::Debug for AuthServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthServer")
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl AuthServer {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenManager>) -> Self {
        Self { users, tokens }
    }

    /// Check the credentials and issue a token for the user.
    ///
    /// Unknown users and wrong passwords get the same answer.
    pub async fn login_user(&self, username: &str, password: &str) -> Result<String, Status> {
        info!("receive a login request for user: {}", username);

        let user = self
            .users
            .find(username)
            .await
            .map_err(|e| Status::internal(format!("cannot find user: {}", e)))?;

        let user = match user {
            Some(user) if user.is_correct_password(password) => user,
            _ => return Err(Status::not_found("incorrect username/password")),
        };

        self.tokens
            .generate(&user)
            .map_err(|e| Status::internal(format!("cannot generate access token: {}", e)))
    }
}

#[tonic::async_trait]
impl AuthService for AuthServer {
    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        let LoginRequest { username, password } = request.into_inner();
        let access_token = self
            .login_user(&username, &password)
            .await
            .map_err(log_status)?;
        Ok(Response::new(LoginResponse { access_token }))
    }
}
