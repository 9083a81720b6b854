//! Seed commitment: server seed, client seed, nonce and their SHA-256 binding.

use crate::errors::EntropyError;
use rand_core::{CryptoRng, OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

/// Random bytes behind a server seed (hex-encoded to 64 chars)
pub const SERVER_SEED_BYTES: usize = 32;
/// Random bytes behind a client seed (hex-encoded to 32 chars)
pub const CLIENT_SEED_BYTES: usize = 16;

static LAST_NONCE: AtomicU64 = AtomicU64::new(0);

/// `SHA256(server_seed + client_seed + decimal(nonce))` as lowercase hex.
pub fn commitment_hash(server_seed: &str, client_seed: &str, nonce: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(server_seed.as_bytes());
    hasher.update(client_seed.as_bytes());
    hasher.update(nonce.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Millisecond timestamp nonce, strictly increasing within this process.
pub fn next_nonce() -> u64 {
    let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let previous = LAST_NONCE
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last.saturating_add(1)))
        })
        .unwrap_or(now);
    now.max(previous.saturating_add(1))
}

/// Committed seed triple for one round.
///
/// Fields are private: a seed cannot be altered once its commitment exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seed {
    server_seed: String,
    client_seed: String,
    nonce: u64,
    commitment_hash: String,
}

impl Seed {
    /// Fresh seed from the OS CSPRNG with a timestamp nonce.
    pub fn generate() -> Result<Self, EntropyError> {
        Self::generate_with(&mut OsRng, next_nonce())
    }

    /// Fresh seed from a caller-supplied cryptographic RNG.
    pub fn generate_with<R: RngCore + CryptoRng>(
        rng: &mut R,
        nonce: u64,
    ) -> Result<Self, EntropyError> {
        let mut server = [0u8; SERVER_SEED_BYTES];
        let mut client = [0u8; CLIENT_SEED_BYTES];
        rng.try_fill_bytes(&mut server)
            .map_err(|e| EntropyError(e.to_string()))?;
        rng.try_fill_bytes(&mut client)
            .map_err(|e| EntropyError(e.to_string()))?;

        Ok(Self::from_parts(hex::encode(server), hex::encode(client), nonce))
    }

    /// Rebuild a seed from disclosed components, recomputing its commitment.
    pub fn from_parts(
        server_seed: impl Into<String>,
        client_seed: impl Into<String>,
        nonce: u64,
    ) -> Self {
        let server_seed = server_seed.into();
        let client_seed = client_seed.into();
        let commitment_hash = commitment_hash(&server_seed, &client_seed, nonce);
        Self {
            server_seed,
            client_seed,
            nonce,
            commitment_hash,
        }
    }

    pub fn server_seed(&self) -> &str {
        &self.server_seed
    }

    pub fn client_seed(&self) -> &str {
        &self.client_seed
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Hash shown to the player before the outcome is used
    pub fn commitment_hash(&self) -> &str {
        &self.commitment_hash
    }

    /// Disclose every component. Only call once the round has resolved.
    pub fn reveal(&self) -> RevealedSeed {
        RevealedSeed {
            server_seed: self.server_seed.clone(),
            client_seed: self.client_seed.clone(),
            nonce: self.nonce,
            commitment_hash: self.commitment_hash.clone(),
        }
    }
}

/// Seed components as disclosed after a round, or as typed in by a verifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedSeed {
    pub server_seed: String,
    pub client_seed: String,
    pub nonce: u64,
    pub commitment_hash: String,
}

impl RevealedSeed {
    /// Seed rebuilt from the disclosed parts; its hash is recomputed, not trusted.
    pub fn to_seed(&self) -> Seed {
        Seed::from_parts(self.server_seed.clone(), self.client_seed.clone(), self.nonce)
    }
}

/// Create a fresh committed seed for a new round.
pub fn create_seed() -> Result<Seed, EntropyError> {
    let seed = Seed::generate()?;
    tracing::trace!(commitment = %seed.commitment_hash(), nonce = seed.nonce(), "Seed committed");
    Ok(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {}
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
            Err(rand_core::Error::new("entropy pool closed"))
        }
    }

    impl CryptoRng for FailingRng {}

    #[test]
    fn test_generated_seed_shape() {
        let seed = create_seed().expect("OS RNG available");

        assert_eq!(seed.server_seed().len(), SERVER_SEED_BYTES * 2);
        assert_eq!(seed.client_seed().len(), CLIENT_SEED_BYTES * 2);
        assert!(hex::decode(seed.server_seed()).is_ok());
        assert_eq!(seed.commitment_hash().len(), 64);
        assert_eq!(
            seed.commitment_hash(),
            commitment_hash(seed.server_seed(), seed.client_seed(), seed.nonce())
        );
    }

    #[test]
    fn test_literal_commitment() {
        let server = "a".repeat(64);
        let client = "b".repeat(32);
        let seed = Seed::from_parts(server.clone(), client.clone(), 1_700_000_000_000);

        let mut hasher = Sha256::new();
        hasher.update(format!("{}{}1700000000000", server, client).as_bytes());
        assert_eq!(seed.commitment_hash(), hex::encode(hasher.finalize()));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a = Seed::generate_with(&mut StdRng::seed_from_u64(7), 42).unwrap();
        let b = Seed::generate_with(&mut StdRng::seed_from_u64(7), 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_entropy_failure_propagates() {
        let result = Seed::generate_with(&mut FailingRng, 1);
        assert!(result.is_err());
    }

    #[test]
    fn test_nonces_strictly_increase() {
        let mut last = next_nonce();
        for _ in 0..1_000 {
            let next = next_nonce();
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn test_reveal_round_trips_to_same_seed() {
        let seed = create_seed().unwrap();
        assert_eq!(seed.reveal().to_seed(), seed);
    }
}
