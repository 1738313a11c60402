// SPDX-License-Identifier: Apache-2.0

use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{Display, Formatter};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthError {
    Malformed,
    BadSignature,
    Expired,
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => f.write_str("token is malformed"),
            Self::BadSignature => f.write_str("token signature mismatch"),
            Self::Expired => f.write_str("token expired"),
        }
    }
}

impl std::error::Error for AuthError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    Admin,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenClaims {
    pub sub: String,
    pub kind: PrincipalKind,
    pub exp: i64,
}

impl TokenClaims {
    #[must_use]
    pub fn new(sub: &str, kind: PrincipalKind, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: sub.to_string(),
            kind,
            exp: expires_at.timestamp(),
        }
    }
}

/// Bearer token: `base64url(claims).base64url(hmac_sha256(secret, claims))`.
pub fn issue_token(secret: &str, claims: &TokenClaims) -> String {
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap_or_default());
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key size");
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    format!("{payload}.{signature}")
}

pub fn verify_token(
    secret: &str,
    token: &str,
    now: DateTime<Utc>,
) -> Result<TokenClaims, AuthError> {
    let (payload, signature) = token.split_once('.').ok_or(AuthError::Malformed)?;
    let signature_bytes = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| AuthError::Malformed)?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key size");
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature_bytes)
        .map_err(|_| AuthError::BadSignature)?;
    let claims: TokenClaims = serde_json::from_slice(
        &URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::Malformed)?,
    )
    .map_err(|_| AuthError::Malformed)?;
    if claims.exp <= now.timestamp() {
        return Err(AuthError::Expired);
    }
    Ok(claims)
}

#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Salted password hash, stored as `salt$hex(sha256(salt || password))`.
#[must_use]
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{salt}${}", hex::encode(hasher.finalize()))
}

#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, _)) = stored.split_once('$') else {
        return false;
    };
    hash_password(password, salt) == stored
}

/// Deterministic per-record salt derived from a seed counter and the clock.
#[must_use]
pub fn new_salt(seed: u64, now: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_be_bytes());
    hasher.update(now.timestamp_nanos_opt().unwrap_or_default().to_be_bytes());
    hex::encode(hasher.finalize())[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn token_round_trip() {
        let now = Utc::now();
        let claims = TokenClaims::new("user-1", PrincipalKind::User, now + Duration::hours(1));
        let token = issue_token("secret", &claims);
        let back = verify_token("secret", &token, now).expect("valid token");
        assert_eq!(back, claims);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = Utc::now();
        let claims = TokenClaims::new("admin-1", PrincipalKind::Admin, now + Duration::hours(1));
        let token = issue_token("secret", &claims);
        assert_eq!(
            verify_token("other", &token, now),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let claims = TokenClaims::new("user-1", PrincipalKind::User, now - Duration::seconds(1));
        let token = issue_token("secret", &claims);
        assert_eq!(verify_token("secret", &token, now), Err(AuthError::Expired));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let now = Utc::now();
        let claims = TokenClaims::new("user-1", PrincipalKind::User, now + Duration::hours(1));
        let token = issue_token("secret", &claims);
        let (_, signature) = token.split_once('.').expect("two parts");
        let forged_claims =
            TokenClaims::new("admin-1", PrincipalKind::Admin, now + Duration::hours(1));
        let forged_payload = URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&forged_claims).expect("serialize"));
        let forged = format!("{forged_payload}.{signature}");
        assert_eq!(
            verify_token("secret", &forged, now),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let stored = hash_password("hunter2hunter2", "salt16charslong!");
        assert!(verify_password("hunter2hunter2", &stored));
        assert!(!verify_password("wrong-password", &stored));
        assert!(!verify_password("hunter2hunter2", "no-dollar-sign"));
    }
}
