//! Share tokens for public wishlist links.
//!
//! `/wishlist/{share_token}` is the only way to view a wishlist without
//! signing in, so the token is the capability. It is 24 bytes from the OS
//! RNG, base64url encoded, and unrelated to the wishlist's numeric ID.
//! Uniqueness is enforced by a unique index; inserts retry on collision.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of random bytes in a token.
const TOKEN_BYTES: usize = 24;

/// Encoded token length (`TOKEN_BYTES * 4 / 3`, no padding).
pub const TOKEN_LENGTH: usize = 32;

/// A malformed share token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid share token")]
pub struct InvalidShareToken;

/// An opaque, unguessable wishlist share token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareToken(String);

impl ShareToken {
    /// Generate a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Validate a token taken from a URL.
    ///
    /// Only checks shape; whether it names a wishlist is up to the database.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShareToken` if the length or alphabet is wrong.
    pub fn parse(s: &str) -> Result<Self, InvalidShareToken> {
        let well_formed = s.len() == TOKEN_LENGTH
            && s
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if well_formed {
            Ok(Self(s.to_owned()))
        } else {
            Err(InvalidShareToken)
        }
    }

    /// The token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ShareToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
