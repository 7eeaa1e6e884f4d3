//! bcrypt password encoder used when issuing credentials.
//!
//! Plaintext passwords are never stored, logged or returned.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt cost must be between {min} and {max}, got {got}")]
    InvalidCost { min: u32, max: u32, got: u32 },
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Log2 round count used when none is configured.
pub const DEFAULT_COST: u32 = 10;

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

#[derive(Clone)]
pub struct PasswordEncoder {
    cost: u32,
    // verified against when the user does not exist, so both paths cost the same
    dummy_hash: String,
}

impl std::fmt::Debug for PasswordEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordEncoder")
            .field("cost", &self.cost)
            .finish()
    }
}

impl PasswordEncoder {
    /// `cost` is the bcrypt log2 round count (default 10 → 1024 rounds).
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(PasswordError::InvalidCost {
                min: MIN_COST,
                max: MAX_COST,
                got: cost,
            });
        }
        let dummy_hash = bcrypt::hash("not-a-real-password", cost)?;
        Ok(Self { cost, dummy_hash })
    }

    pub fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(plain, self.cost)?)
    }

    /// A malformed hash verifies as `false`.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        bcrypt::verify(plain, hash).unwrap_or(false)
    }

    /// Verify against `hash`, or burn the same work on a dummy hash and fail.
    pub fn verify_or_dummy(&self, plain: &str, hash: Option<&str>) -> bool {
        match hash {
            Some(hash) => self.verify(plain, hash),
            None => {
                let _ = self.verify(plain, &self.dummy_hash);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> PasswordEncoder {
        PasswordEncoder::new(MIN_COST).unwrap()
    }

    #[test]
    fn hash_then_verify_round_trips() {
        let enc = encoder();
        for plain in ["hunter2", "pässwörd with spaces", "0123456789"] {
            let hash = enc.hash(plain).unwrap();
            assert!(enc.verify(plain, &hash), "{plain:?}");
        }
    }

    #[test]
    fn different_plaintext_does_not_verify() {
        let enc = encoder();
        let hash = enc.hash("correct horse").unwrap();
        assert!(!enc.verify("correct horse!", &hash));
        assert!(!enc.verify("correct", &hash));
    }

    #[test]
    fn hashes_are_salted_and_never_contain_plaintext() {
        let enc = encoder();
        let a = enc.hash("same").unwrap();
        let b = enc.hash("same").unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("same"));
        assert!(a.starts_with("$2"));
    }

    #[test]
    fn malformed_hash_is_false_not_error() {
        assert!(!encoder().verify("pw", "not-a-bcrypt-hash"));
    }

    #[test]
    fn missing_user_never_verifies() {
        assert!(!encoder().verify_or_dummy("not-a-real-password", None));
    }

    #[test]
    fn default_cost_hashes_at_ten_rounds() {
        let hash = PasswordEncoder::new(DEFAULT_COST).unwrap().hash("pw").unwrap();
        assert_eq!(&hash[4..7], "10$");
    }

    #[test]
    fn cost_outside_bcrypt_range_is_rejected() {
        for cost in [0, 3, 32] {
            assert!(matches!(
                PasswordEncoder::new(cost),
                Err(PasswordError::InvalidCost { got, .. }) if got == cost
            ));
        }
    }
}
