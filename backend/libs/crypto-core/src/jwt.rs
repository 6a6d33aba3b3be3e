/// JWT issuing and validation for Yatube services
///
/// Tokens are signed with RS256 only. Keys are loaded once at startup and kept
/// in process-wide cells, so handlers and middleware can validate tokens
/// without threading key material through application state.
///
/// Two token kinds exist:
///
/// - **access**: presented as `Authorization: Bearer <token>` on API requests
/// - **refresh**: exchanged at `/jwt/refresh/` for a new access token
///
/// ## Usage
///
/// ```rust,ignore
/// use crypto_core::jwt;
///
/// let (private_pem, public_pem) = jwt::load_keys_from_env()?;
/// jwt::initialize_jwt_keys(&private_pem, &public_pem)?;
///
/// let pair = jwt::generate_token_pair(42, "leo")?;
/// let claims = jwt::validate_access_token(&pair.access)?;
/// assert_eq!(claims.user_id()?, 42);
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Constants
// ============================================================================

/// Default access token lifetime (1 day)
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 24 * 3600;
/// Default refresh token lifetime (7 days)
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 3600;

const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

const PRIVATE_KEY_ENV: &str = "JWT_PRIVATE_KEY_PEM";
const PUBLIC_KEY_ENV: &str = "JWT_PUBLIC_KEY_PEM";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT keys not initialized")]
    NotInitialized,

    #[error("JWT keys already initialized")]
    AlreadyInitialized,

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("missing key material: {0}")]
    MissingKey(String),

    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("expected {expected} token, got {found} token")]
    WrongTokenType { expected: TokenType, found: TokenType },

    #[error("failed to sign token: {0}")]
    Signing(String),
}

pub type Result<T> = std::result::Result<T, JwtError>;

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT claims carried by every Yatube token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id as decimal string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    pub token_type: TokenType,
    pub username: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|_| JwtError::Invalid(format!("malformed subject '{}'", self.sub)))
    }
}

/// Token pair returned by `/jwt/create/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Copy)]
struct TokenLifetimes {
    access: Duration,
    refresh: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::seconds(DEFAULT_ACCESS_TTL_SECS),
            refresh: Duration::seconds(DEFAULT_REFRESH_TTL_SECS),
        }
    }
}

// ============================================================================
// Key Storage
// ============================================================================

static JWT_ENCODING_KEY: OnceCell<EncodingKey> = OnceCell::new();
static JWT_DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();
static TOKEN_LIFETIMES: OnceCell<TokenLifetimes> = OnceCell::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize signing and validation keys from PEM strings.
///
/// Can only succeed once per process.
pub fn initialize_jwt_keys(private_key_pem: &str, public_key_pem: &str) -> Result<()> {
    let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
        .map_err(|e| JwtError::InvalidKey(format!("RSA private key: {e}")))?;
    let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| JwtError::InvalidKey(format!("RSA public key: {e}")))?;

    JWT_ENCODING_KEY
        .set(encoding_key)
        .map_err(|_| JwtError::AlreadyInitialized)?;
    JWT_DECODING_KEY
        .set(decoding_key)
        .map_err(|_| JwtError::AlreadyInitialized)?;

    Ok(())
}

/// Initialize only the validation key (no token issuing).
pub fn initialize_jwt_validation_only(public_key_pem: &str) -> Result<()> {
    let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| JwtError::InvalidKey(format!("RSA public key: {e}")))?;

    JWT_DECODING_KEY
        .set(decoding_key)
        .map_err(|_| JwtError::AlreadyInitialized)
}

/// Override token lifetimes. Must run before the first token is issued;
/// later calls are ignored.
pub fn configure_token_lifetimes(access_ttl_secs: i64, refresh_ttl_secs: i64) -> bool {
    TOKEN_LIFETIMES
        .set(TokenLifetimes {
            access: Duration::seconds(access_ttl_secs),
            refresh: Duration::seconds(refresh_ttl_secs),
        })
        .is_ok()
}

pub fn is_initialized() -> bool {
    JWT_DECODING_KEY.get().is_some()
}

/// Read PEM keys from `JWT_PRIVATE_KEY_PEM` / `JWT_PUBLIC_KEY_PEM`.
///
/// Each variable may also be given as `<NAME>_FILE` pointing at a PEM file.
pub fn load_keys_from_env() -> Result<(String, String)> {
    Ok((read_pem_env(PRIVATE_KEY_ENV)?, read_pem_env(PUBLIC_KEY_ENV)?))
}

fn read_pem_env(name: &str) -> Result<String> {
    if let Ok(value) = std::env::var(name) {
        // Single-line env values commonly carry escaped newlines
        return Ok(value.replace("\\n", "\n"));
    }

    let file_var = format!("{name}_FILE");
    let path = std::env::var(&file_var)
        .map_err(|_| JwtError::MissingKey(format!("{name} or {file_var} must be set")))?;
    std::fs::read_to_string(&path)
        .map_err(|e| JwtError::MissingKey(format!("cannot read {path}: {e}")))
}

fn encoding_key() -> Result<&'static EncodingKey> {
    JWT_ENCODING_KEY.get().ok_or(JwtError::NotInitialized)
}

fn decoding_key() -> Result<&'static DecodingKey> {
    JWT_DECODING_KEY.get().ok_or(JwtError::NotInitialized)
}

fn lifetimes() -> TokenLifetimes {
    TOKEN_LIFETIMES.get().copied().unwrap_or_default()
}

// ============================================================================
// Token Generation
// ============================================================================

fn issue(user_id: i64, username: &str, token_type: TokenType, ttl: Duration) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
        token_type,
        username: username.to_string(),
    };

    encode(&Header::new(JWT_ALGORITHM), &claims, encoding_key()?)
        .map_err(|e| JwtError::Signing(e.to_string()))
}

pub fn generate_access_token(user_id: i64, username: &str) -> Result<String> {
    issue(user_id, username, TokenType::Access, lifetimes().access)
}

pub fn generate_refresh_token(user_id: i64, username: &str) -> Result<String> {
    issue(user_id, username, TokenType::Refresh, lifetimes().refresh)
}

pub fn generate_token_pair(user_id: i64, username: &str) -> Result<TokenPair> {
    Ok(TokenPair {
        access: generate_access_token(user_id, username)?,
        refresh: generate_refresh_token(user_id, username)?,
    })
}

// ============================================================================
// Token Validation
// ============================================================================

/// Verify signature and expiry; accepts either token kind.
pub fn validate_token(token: &str) -> Result<Claims> {
    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<Claims>(token, decoding_key()?, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })
}

fn validate_kind(token: &str, expected: TokenType) -> Result<Claims> {
    let claims = validate_token(token)?;
    if claims.token_type != expected {
        return Err(JwtError::WrongTokenType {
            expected,
            found: claims.token_type,
        });
    }
    Ok(claims)
}

pub fn validate_access_token(token: &str) -> Result<Claims> {
    validate_kind(token, TokenType::Access)
}

pub fn validate_refresh_token(token: &str) -> Result<Claims> {
    validate_kind(token, TokenType::Refresh)
}

// ============================================================================
// Tests
// ============================================================================
