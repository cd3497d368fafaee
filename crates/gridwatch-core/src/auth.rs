//! Dashboard user registration, login and session tokens.
//!
//! # Password storage
//!
//! Passwords are stretched with PBKDF2-HMAC-SHA256 over a random 16-byte
//! salt and stored as a PHC string:
//!
//! ```text
//! $pbkdf2-sha256$i=<rounds>,l=32$<salt>$<hash>
//! ```
//!
//! The iteration count travels with the hash, so raising
//! `auth.hash_rounds` only affects new registrations.
//!
//! # Tokens
//!
//! Login issues a compact HS256 JWT with header
//! `{"alg":"HS256","typ":"JWT"}` and payload
//! `{"user":{"id":...},"iat":...,"exp":...}`. Tokens expire after
//! `auth.token_ttl_hours` (5 by default).

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use gridwatch_types::{NewUser, User, UserId};
use hmac::{Hmac, Mac};
use pbkdf2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};
use pbkdf2::{Params, Pbkdf2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{info, warn};
use validator::Validate;

use crate::config::AuthConfig;
use crate::store::{StoreError, UserDirectory};

type HmacSha256 = Hmac<Sha256>;

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Errors from registration, login and token handling.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The registration payload failed validation.
    #[error("invalid registration: {0}")]
    InvalidInput(String),

    /// The email is already registered.
    #[error("User already exists")]
    UserExists,

    /// Unknown email or wrong password. The two are not distinguished.
    #[error("Invalid Credentials")]
    InvalidCredentials,

    /// The token is malformed or its signature does not match.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The token was valid but has expired.
    #[error("token expired")]
    TokenExpired,

    /// The user directory failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Hashing or signing could not be performed.
    #[error("auth internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Body of `POST /api/auth/register`.
#[derive(Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Given name.
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,
    /// Family name.
    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,
    /// Login email.
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    /// Plain-text password.
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /api/auth/login`.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Password hashing
// ---------------------------------------------------------------------------

/// Salted PBKDF2 password hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    rounds: u32,
}

impl PasswordHasher {
    /// Hasher producing hashes with `rounds` iterations.
    pub const fn new(rounds: u32) -> Self {
        Self { rounds }
    }

    /// Hash `password` under a fresh random salt, as a PHC string.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if the hash cannot be encoded.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill(&mut salt);
        let salt = SaltString::encode_b64(&salt).map_err(|e| AuthError::Internal(e.to_string()))?;
        let params = Params {
            rounds: self.rounds,
            output_length: HASH_LEN,
        };
        let hash = Pbkdf2
            .hash_password_customized(password.as_bytes(), None, None, params, &salt)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Check `password` against a PHC-encoded hash in constant time.
    /// Malformed hashes never match.
    pub fn verify(password: &str, encoded: &str) -> bool {
        PasswordHash::new(encoded)
            .is_ok_and(|hash| Pbkdf2.verify_password(password.as_bytes(), &hash).is_ok())
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// JOSE header of a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader<'a> {
    /// Signature algorithm; always `HS256`.
    pub alg: &'a str,
    /// Token type; always `JWT`.
    pub typ: &'a str,
}

impl TokenHeader<'static> {
    /// The only header this service issues or accepts.
    pub const HS256: Self = Self {
        alg: "HS256",
        typ: "JWT",
    };
}

/// The user a token was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUser {
    /// The user's ID.
    pub id: UserId,
}

/// Payload of a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user.
    pub user: TokenUser,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
}

/// Issues and checks HS256 session tokens.
#[derive(Clone)]
pub struct TokenSigner {
    key: Vec<u8>,
    ttl: TimeDelta,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    /// Signer keyed with `secret`, issuing tokens valid for `ttl`.
    pub fn new(secret: &str, ttl: TimeDelta) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
            ttl,
        }
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(&self.key).map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Issue a token for `user_id`, valid from `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if the claims cannot be encoded.
    pub fn sign(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, AuthError> {
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Internal(String::from("token expiry out of range")))?;
        let claims = Claims {
            user: TokenUser { id: user_id },
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        let header = serde_json::to_vec(&TokenHeader::HS256)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        let payload = serde_json::to_vec(&claims).map_err(|e| AuthError::Internal(e.to_string()))?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{signing_input}.{signature}"))
    }

    /// Check a token's signature and expiry as of `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] for a malformed or forged token
    /// and [`AuthError::TokenExpired`] once `exp` has passed.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let malformed = |e: &dyn fmt::Display| AuthError::InvalidToken(format!("malformed token: {e}"));

        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::InvalidToken(String::from(
                "expected three dot-separated parts",
            )));
        };

        let header_json = URL_SAFE_NO_PAD.decode(header).map_err(|e| malformed(&e))?;
        let parsed: TokenHeader<'_> =
            serde_json::from_slice(&header_json).map_err(|e| malformed(&e))?;
        if parsed != TokenHeader::HS256 {
            return Err(AuthError::InvalidToken(format!(
                "unsupported header alg={} typ={}",
                parsed.alg, parsed.typ
            )));
        }

        let signature = URL_SAFE_NO_PAD.decode(signature).map_err(|e| malformed(&e))?;
        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|e| AuthError::InvalidToken(format!("bad signature: {e}")))?;

        let payload = URL_SAFE_NO_PAD.decode(payload).map_err(|e| malformed(&e))?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|e| malformed(&e))?;
        if claims.exp <= now.timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Registration and login over a [`UserDirectory`].
#[derive(Debug, Clone)]
pub struct AuthService<U> {
    users: U,
    hasher: PasswordHasher,
    signer: TokenSigner,
}

impl<U: UserDirectory> AuthService<U> {
    /// Assemble a service from its parts.
    pub const fn new(users: U, hasher: PasswordHasher, signer: TokenSigner) -> Self {
        Self {
            users,
            hasher,
            signer,
        }
    }

    /// Build the service from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if the token lifetime is out of
    /// range.
    pub fn from_config(users: U, config: &AuthConfig) -> Result<Self, AuthError> {
        let ttl = TimeDelta::try_hours(i64::from(config.token_ttl_hours))
            .ok_or_else(|| AuthError::Internal(String::from("token lifetime out of range")))?;
        Ok(Self::new(
            users,
            PasswordHasher::new(config.hash_rounds),
            TokenSigner::new(&config.jwt_secret, ttl),
        ))
    }

    /// The token signer, for checking issued tokens.
    pub const fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidInput`] for a bad payload,
    /// [`AuthError::UserExists`] if the email is taken, or
    /// [`AuthError::Store`] if the directory fails.
    pub async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        registration
            .validate()
            .map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        if self.users.find_by_email(&registration.email).await?.is_some() {
            return Err(AuthError::UserExists);
        }

        let hasher = self.hasher;
        let password = registration.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))??;

        let user = self
            .users
            .insert(NewUser {
                first_name: registration.first_name,
                last_name: registration.last_name,
                email: registration.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::UserExists,
                other => AuthError::Store(other),
            })?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a session token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a
    /// wrong password, or [`AuthError::Store`] if the directory fails.
    pub async fn login(&self, credentials: Credentials) -> Result<String, AuthError> {
        let Some(user) = self.users.find_by_email(&credentials.email).await? else {
            warn!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let password = credentials.password;
        let encoded = user.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || PasswordHasher::verify(&password, &encoded))
                .await
                .map_err(|e| AuthError::Internal(e.to_string()))?;
        if !matches {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        self.signer.sign(user.id, Utc::now())
    }
}
