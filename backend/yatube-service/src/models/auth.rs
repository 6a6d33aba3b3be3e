use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Credentials exchanged for a token pair
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TokenObtainRequest {
    #[validate(required)]
    pub username: Option<String>,
    #[validate(required)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TokenRefreshRequest {
    #[validate(required)]
    pub refresh: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TokenVerifyRequest {
    #[validate(required)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access: String,
}
