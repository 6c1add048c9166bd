//! Signed access/refresh token pairs.
//!
//! # Invariants
//! - Tokens are HS256 JWTs carrying `username` and `is_staff` next to the
//!   standard `exp`/`iat`/`jti` claims.
//! - Decoding checks signature, expiry (no leeway) and token type.

use crate::auth::{AuthError, AuthResult, UserIdentity};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl Display for TokenType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => f.write_str("access"),
            Self::Refresh => f.write_str("refresh"),
        }
    }
}

/// Claims carried by both token kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub token_type: TokenType,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
    /// Issue time, seconds since the Unix epoch.
    pub iat: u64,
    pub jti: String,
    pub user_id: i64,
    pub username: String,
    pub is_staff: bool,
}

impl TokenClaims {
    /// Identity the token asserts.
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            user_id: self.user_id,
            username: self.username.clone(),
            is_staff: self.is_staff,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Signing secret and token lifetimes.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSettings {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenSettings {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
        }
    }
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Issues and verifies tokens with one shared secret.
pub struct TokenIssuer {
    settings: TokenSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(settings: TokenSettings) -> AuthResult<Self> {
        if settings.secret.trim().is_empty() {
            return Err(AuthError::MissingSecret);
        }
        let encoding_key = EncodingKey::from_secret(settings.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(settings.secret.as_bytes());
        Ok(Self {
            settings,
            encoding_key,
            decoding_key,
        })
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    /// Issues an access/refresh pair for `identity`.
    pub fn issue_pair(&self, identity: &UserIdentity) -> AuthResult<TokenPair> {
        self.issue_pair_at(identity, unix_now()?)
    }

    /// Verifies `token` as a token of `expected` type and returns its claims.
    pub fn decode(&self, token: &str, expected: TokenType) -> AuthResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(
            |err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(err),
            },
        )?;
        if data.claims.token_type != expected {
            return Err(AuthError::WrongTokenType {
                expected,
                found: data.claims.token_type,
            });
        }
        Ok(data.claims)
    }

    /// Exchanges a valid refresh token for a new access token with the same
    /// identity claims.
    pub fn refresh_access(&self, refresh_token: &str) -> AuthResult<String> {
        let claims = self.decode(refresh_token, TokenType::Refresh)?;
        let token = self.sign(&claims.identity(), TokenType::Access, unix_now()?)?;
        info!(
            "event=token_refresh module=auth status=ok user_id={}",
            claims.user_id
        );
        Ok(token)
    }

    pub(crate) fn issue_pair_at(&self, identity: &UserIdentity, now: u64) -> AuthResult<TokenPair> {
        let pair = TokenPair {
            access: self.sign(identity, TokenType::Access, now)?,
            refresh: self.sign(identity, TokenType::Refresh, now)?,
        };
        info!(
            "event=token_issue module=auth status=ok user_id={} is_staff={}",
            identity.user_id, identity.is_staff
        );
        Ok(pair)
    }

    fn sign(&self, identity: &UserIdentity, token_type: TokenType, now: u64) -> AuthResult<String> {
        let ttl = match token_type {
            TokenType::Access => self.settings.access_ttl,
            TokenType::Refresh => self.settings.refresh_ttl,
        };
        let claims = TokenClaims {
            token_type,
            exp: now.saturating_add(ttl.as_secs()),
            iat: now,
            jti: Uuid::new_v4().simple().to_string(),
            user_id: identity.user_id,
            username: identity.username.clone(),
            is_staff: identity.is_staff,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::Encode)
    }
}

fn unix_now() -> AuthResult<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .map_err(|_| AuthError::ClockBeforeEpoch)
}
