//! Salted admin secret digests.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use spinwheel_abi::{StoreError, StoreResult};
use spinwheel_lib::WheelRng;

pub const MIN_SECRET_LEN: usize = 4;

/// Secret in effect until an admin changes it.
pub const DEFAULT_SECRET: &str = "admin";

const SALT_LEN: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretDigest {
    salt: String,
    digest: String,
}

fn digest_with(salt: &[u8], secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(secret.as_bytes());
    STANDARD.encode(hasher.finalize())
}

impl SecretDigest {
    pub fn new(secret: &str, rng: &mut WheelRng) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rng.fill_bytes(&mut salt);
        Self {
            digest: digest_with(&salt, secret),
            salt: STANDARD.encode(salt),
        }
    }

    pub fn matches(&self, secret: &str) -> bool {
        match STANDARD.decode(&self.salt) {
            Ok(salt) => digest_with(&salt, secret) == self.digest,
            Err(_) => false,
        }
    }
}

/// Check a replacement secret before it is hashed.
pub fn validate_new_secret(old: &str, new: &str) -> StoreResult<()> {
    if old.is_empty() {
        return Err(StoreError::MissingField("current password"));
    }
    if new.is_empty() {
        return Err(StoreError::MissingField("new password"));
    }
    if new.chars().count() < MIN_SECRET_LEN {
        return Err(StoreError::SecretTooShort {
            min: MIN_SECRET_LEN,
        });
    }
    Ok(())
}
