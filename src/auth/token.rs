//! Bearer token management
//!
//! Uses HMAC-signed stateless tokens.
//! No server-side token storage needed.

use base64::{Engine as _, engine::general_purpose};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the token holder
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Claims for `username` valid for `ttl_minutes` from now
    pub fn new(username: &str, ttl_minutes: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(ttl_minutes)).timestamp(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }
}

fn sign(payload_b64: &str, secret: &str) -> Result<HmacSha256, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Encryption(e.to_string()))?;
    mac.update(payload_b64.as_bytes());
    Ok(mac)
}

/// Create a signed token
///
/// Token format: base64url(claims).base64url(hmac_sha256(payload))
///
/// # Arguments
/// * `claims` - Claims to encode
/// * `secret` - HMAC secret key
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, AppError> {
    // 1. Serialize claims to JSON
    let payload = serde_json::to_string(claims).map_err(|e| AppError::Internal(e.into()))?;

    // 2. Base64 encode the payload
    let payload_b64 = general_purpose::URL_SAFE_NO_PAD.encode(payload.as_bytes());

    // 3. Create HMAC-SHA256 signature
    let signature = sign(&payload_b64, secret)?.finalize().into_bytes();
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(signature);

    // 4. Return "{payload}.{signature}"
    Ok(format!("{}.{}", payload_b64, signature_b64))
}

/// Verify and decode a token
///
/// # Errors
/// Returns `Unauthorized` if the token is malformed, the signature
/// does not match or the token is expired
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    // 1. Split token into payload and signature
    let (payload_b64, signature_b64) = token
        .split_once('.')
        .ok_or_else(AppError::invalid_credentials)?;

    // 2. Verify HMAC signature
    let signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AppError::invalid_credentials())?;
    sign(payload_b64, secret)?
        .verify_slice(&signature)
        .map_err(|_| AppError::invalid_credentials())?;

    // 3. Decode and deserialize payload
    let payload_bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| AppError::invalid_credentials())?;
    let claims: Claims =
        serde_json::from_slice(&payload_bytes).map_err(|_| AppError::invalid_credentials())?;

    // 4. Check expiry
    if claims.is_expired() {
        return Err(AppError::invalid_credentials());
    }

    Ok(claims)
}
