//! Customer identifiers.

use rand::RngCore;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use salesgen_core::{CustomerId, NormalizedEmail};

use crate::errors::GenerationError;
use crate::rng::random_uuid;

/// How new customers get their identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IdentityPolicy {
    /// Random version 4 UUID per customer; not stable across runs.
    #[default]
    RandomToken,
    /// SHA-256 of the normalized email folded into a non-negative `i64`.
    ///
    /// The same email always yields the same id, so re-ingesting a dataset
    /// is idempotent.
    DeterministicHash,
}

impl IdentityPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RandomToken => "random_token",
            Self::DeterministicHash => "deterministic_hash",
        }
    }
}

/// Derives customer ids under one [`IdentityPolicy`].
#[derive(Debug, Clone, Copy)]
pub struct IdentityGenerator {
    policy: IdentityPolicy,
}

impl IdentityGenerator {
    pub fn new(policy: IdentityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> IdentityPolicy {
        self.policy
    }

    /// Normalize `email` and derive its id.
    ///
    /// Fails only when the email is empty or malformed.
    pub fn derive(&self, email: &str, rng: &mut dyn RngCore) -> Result<CustomerId, GenerationError> {
        let email = NormalizedEmail::parse(email)?;
        Ok(self.derive_normalized(&email, rng))
    }

    pub fn derive_normalized(&self, email: &NormalizedEmail, rng: &mut dyn RngCore) -> CustomerId {
        match self.policy {
            IdentityPolicy::RandomToken => random_token(rng),
            IdentityPolicy::DeterministicHash => hashed_id(email),
        }
    }
}

/// Random UUID identifier.
pub fn random_token(rng: &mut dyn RngCore) -> CustomerId {
    CustomerId::Token(random_uuid(rng).to_string())
}

/// Stable identifier for `email`.
///
/// The first eight digest bytes are read big-endian and shifted right by one
/// so the value always fits a signed 64-bit column.
pub fn hashed_id(email: &NormalizedEmail) -> CustomerId {
    let digest = Sha256::digest(email.as_str().as_bytes());
    let mut prefix = [0_u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let value = (u64::from_be_bytes(prefix) >> 1) as i64;
    CustomerId::Numeric(value)
}
