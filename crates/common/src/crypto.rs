use std::fmt;

use thiserror::Error;

const SALT_LEN: usize = 16;
const SESSION_CONTEXT: &str = "eternal-shadow-nexus 2024 session token v1";

/// Hashes a password into the stored `salt$hash` form.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::fill(&mut salt[..]);
    let digest = salted_digest(&salt, password);
    format!("{}${}", hex::encode(salt), digest.to_hex())
}

/// Checks `password` against a `salt$hash` string produced by [`hash_password`].
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, hash_hex)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), blake3::Hash::from_hex(hash_hex)) else {
        return false;
    };
    // blake3::Hash equality is constant time
    salted_digest(&salt, password) == expected
}

fn salted_digest(salt: &[u8], password: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed session token")]
    Malformed,
    #[error("invalid session token signature")]
    BadSignature,
    #[error("session token expired")]
    Expired,
}

/// A signed `user_id.issued_at.signature` bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub user_id: i64,
    pub issued_at: i64,
}

impl SessionToken {
    pub fn new(user_id: i64, issued_at: i64) -> Self {
        Self { user_id, issued_at }
    }

    pub fn sign(&self, secret: &str) -> String {
        let payload = self.payload();
        let signature = blake3::keyed_hash(&session_key(secret), payload.as_bytes());
        format!("{payload}.{}", signature.to_hex())
    }

    /// Parses and checks a token. `ttl_secs` bounds how old `issued_at` may be relative to `now`.
    pub fn verify(token: &str, secret: &str, now: i64, ttl_secs: i64) -> Result<Self, TokenError> {
        let (payload, signature_hex) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        let (user_id, issued_at) = payload.split_once('.').ok_or(TokenError::Malformed)?;
        let session = Self {
            user_id: user_id.parse().map_err(|_| TokenError::Malformed)?,
            issued_at: issued_at.parse().map_err(|_| TokenError::Malformed)?,
        };

        let signature = blake3::Hash::from_hex(signature_hex).map_err(|_| TokenError::Malformed)?;
        let expected = blake3::keyed_hash(&session_key(secret), payload.as_bytes());
        if signature != expected {
            return Err(TokenError::BadSignature);
        }

        if now - session.issued_at > ttl_secs {
            return Err(TokenError::Expired);
        }
        Ok(session)
    }

    fn payload(&self) -> String {
        format!("{}.{}", self.user_id, self.issued_at)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session(user={}, issued_at={})", self.user_id, self.issued_at)
    }
}

fn session_key(secret: &str) -> [u8; 32] {
    blake3::derive_key(SESSION_CONTEXT, secret.as_bytes())
}
