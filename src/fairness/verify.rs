//! Commitment verification.
//!
//! Proves only that the disclosed seed is the one committed to. Proving a
//! specific outcome needs a replay of the derivation (see `games::replay`).

use super::seed::{commitment_hash, RevealedSeed};

/// `true` iff `SHA256(server_seed + client_seed + nonce)` equals `expected_hash`.
///
/// The nonce is taken as text because it arrives from users. Only the
/// canonical decimal form that was hashed matches: no sign, no whitespace and
/// no leading zeros. Hash comparison ignores case and surrounding whitespace.
pub fn verify(server_seed: &str, client_seed: &str, nonce: &str, expected_hash: &str) -> bool {
    match parse_nonce(nonce) {
        Some(nonce) => verify_parts(server_seed, client_seed, nonce, expected_hash),
        None => false,
    }
}

/// Nonce from its canonical decimal text, the exact form that gets hashed.
pub fn parse_nonce(text: &str) -> Option<u64> {
    let canonical = !text.is_empty()
        && text.bytes().all(|b| b.is_ascii_digit())
        && (text == "0" || !text.starts_with('0'));
    if canonical {
        text.parse().ok()
    } else {
        None
    }
}

/// [`verify`] with an already numeric nonce.
pub fn verify_parts(server_seed: &str, client_seed: &str, nonce: u64, expected_hash: &str) -> bool {
    let computed = commitment_hash(server_seed, client_seed, nonce);
    let valid = computed.eq_ignore_ascii_case(expected_hash.trim());
    tracing::debug!(nonce, valid, "Commitment verification");
    valid
}

/// Check a revealed seed against the hash it carries.
pub fn verify_seed(revealed: &RevealedSeed) -> bool {
    verify_parts(
        &revealed.server_seed,
        &revealed.client_seed,
        revealed.nonce,
        &revealed.commitment_hash,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fairness::seed::Seed;

    #[test]
    fn test_literal_example() {
        let server = "a".repeat(64);
        let client = "b".repeat(32);
        let hash = commitment_hash(&server, &client, 1_700_000_000_000);

        assert!(verify(&server, &client, "1700000000000", &hash));
        assert!(!verify(&server, &client, "1700000000001", &hash));
    }

    #[test]
    fn test_malformed_input_is_false() {
        let seed = Seed::from_parts("a".repeat(64), "b".repeat(32), 5);
        let hash = seed.commitment_hash();

        assert!(!verify(seed.server_seed(), seed.client_seed(), "five", hash));
        assert!(!verify(seed.server_seed(), seed.client_seed(), "-5", hash));
        assert!(!verify(seed.server_seed(), seed.client_seed(), "", hash));
        assert!(!verify(seed.server_seed(), seed.client_seed(), "99999999999999999999999", hash));
        assert!(!verify(seed.server_seed(), seed.client_seed(), "5", "not-a-hash"));
        assert!(!verify("zz", seed.client_seed(), "5", hash));
    }

    #[test]
    fn test_uppercase_hash_accepted() {
        let seed = Seed::from_parts("c".repeat(64), "d".repeat(32), 9);
        let upper = seed.commitment_hash().to_uppercase();
        assert!(verify(seed.server_seed(), seed.client_seed(), "9", &upper));
    }

    #[test]
    fn test_only_canonical_nonce_text_matches() {
        let seed = Seed::from_parts("a".repeat(64), "b".repeat(32), 1_700_000_000_000);
        let hash = seed.commitment_hash();

        assert!(verify(seed.server_seed(), seed.client_seed(), "1700000000000", hash));
        assert!(!verify(seed.server_seed(), seed.client_seed(), "01700000000000", hash));
        assert!(!verify(seed.server_seed(), seed.client_seed(), " 1700000000000", hash));
        assert!(!verify(seed.server_seed(), seed.client_seed(), "1700000000000\n", hash));
        assert!(!verify(seed.server_seed(), seed.client_seed(), "+1700000000000", hash));

        let zero = Seed::from_parts("a".repeat(64), "b".repeat(32), 0);
        assert!(verify(zero.server_seed(), zero.client_seed(), "0", zero.commitment_hash()));
        assert!(!verify(zero.server_seed(), zero.client_seed(), "00", zero.commitment_hash()));
        assert_eq!(parse_nonce("42"), Some(42));
        assert_eq!(parse_nonce("042"), None);
    }

    #[test]
    fn test_verify_seed_detects_tampering() {
        let seed = Seed::from_parts("e".repeat(64), "f".repeat(32), 11);
        let mut revealed = seed.reveal();
        assert!(verify_seed(&revealed));

        revealed.server_seed.replace_range(0..1, "0");
        assert!(!verify_seed(&revealed));
    }
}
