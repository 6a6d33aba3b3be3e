/// Token service - issue, refresh and verify JWTs
use std::sync::Arc;

use crypto_core::jwt;
use tracing::{info, warn};
use validator::Validate;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{
    AccessTokenResponse, TokenObtainRequest, TokenPairResponse, TokenRefreshRequest,
    TokenVerifyRequest,
};
use crate::security::verify_password;

const INVALID_CREDENTIALS: &str = "No active account found with the given credentials";

pub struct AuthService {
    store: Arc<dyn Store>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Exchange username and password for an access/refresh pair
    pub async fn obtain(&self, req: TokenObtainRequest) -> Result<TokenPairResponse> {
        req.validate()?;
        let username = req.username.unwrap_or_default();
        let password = req.password.unwrap_or_default();

        let user = self.store.get_user_by_username(&username).await?;
        let Some(user) = user.filter(|u| verify_password(&password, &u.password_hash)) else {
            warn!(username = %username, "token request with invalid credentials");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let pair = jwt::generate_token_pair(user.id, &user.username)?;
        info!(user_id = user.id, "token pair issued");
        Ok(TokenPairResponse {
            access: pair.access,
            refresh: pair.refresh,
        })
    }

    /// New access token from a refresh token whose user still exists
    pub async fn refresh(&self, req: TokenRefreshRequest) -> Result<AccessTokenResponse> {
        req.validate()?;
        let claims = jwt::validate_refresh_token(&req.refresh.unwrap_or_default())?;
        let user_id = claims.user_id()?;

        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        let access = jwt::generate_access_token(user.id, &user.username)?;
        Ok(AccessTokenResponse { access })
    }

    /// Check signature and expiry of a token of either kind
    pub fn verify(&self, req: TokenVerifyRequest) -> Result<()> {
        req.validate()?;
        jwt::validate_token(&req.token.unwrap_or_default())?;
        Ok(())
    }
}
