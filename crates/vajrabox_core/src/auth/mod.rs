//! Credential check and token issuance for catalog staff.
//!
//! # Responsibility
//! - Resolve credentials through a caller-supplied verifier.
//! - Issue signed token pairs asserting identity and the staff flag.
//!
//! Password storage lives with the verifier; this module never sees hashes.

pub mod token;

use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use token::{TokenIssuer, TokenPair, TokenType};

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug)]
pub enum AuthError {
    /// Username/password pair did not resolve to an active user.
    InvalidCredentials,
    /// Signing secret is empty.
    MissingSecret,
    /// Token is past its `exp`.
    Expired,
    /// Token is malformed or its signature does not verify.
    InvalidToken(jsonwebtoken::errors::Error),
    WrongTokenType { expected: TokenType, found: TokenType },
    Encode(jsonwebtoken::errors::Error),
    /// System clock reports a time before the Unix epoch.
    ClockBeforeEpoch,
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => {
                write!(f, "no active account found with the given credentials")
            }
            Self::MissingSecret => write!(f, "token signing secret is empty"),
            Self::Expired => write!(f, "token is expired"),
            Self::InvalidToken(err) => write!(f, "token is invalid: {err}"),
            Self::WrongTokenType { expected, found } => {
                write!(f, "expected {expected} token, got {found} token")
            }
            Self::Encode(err) => write!(f, "cannot sign token: {err}"),
            Self::ClockBeforeEpoch => write!(f, "system clock is before the Unix epoch"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidToken(err) | Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

/// Authenticated user as asserted by tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: i64,
    pub username: String,
    pub is_staff: bool,
}

/// Resolves a username/password pair to an active user.
pub trait CredentialVerifier {
    fn verify(&self, username: &str, password: &str) -> Option<UserIdentity>;
}

/// Checks credentials and issues a token pair for the resolved user.
pub fn obtain_token_pair<V: CredentialVerifier + ?Sized>(
    verifier: &V,
    issuer: &TokenIssuer,
    username: &str,
    password: &str,
) -> AuthResult<TokenPair> {
    match verifier.verify(username, password) {
        Some(identity) => issuer.issue_pair(&identity),
        None => {
            warn!("event=token_issue module=auth status=rejected reason=invalid_credentials");
            Err(AuthError::InvalidCredentials)
        }
    }
}
