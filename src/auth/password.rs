use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::HashingConfig;

/// One-way, salted password hashing.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plain: &str) -> anyhow::Result<String>;
    /// `Ok(false)` on mismatch. `Err` only when the stored hash is unusable.
    fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool>;
    /// Spend the same effort as `verify` without a stored hash. Used when the
    /// account does not exist so misses take as long as wrong passwords.
    fn verify_decoy(&self, plain: &str);
}

/// Argon2id hasher. Verification reads its parameters from the stored hash,
/// so changing the cost settings does not invalidate existing passwords.
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
    decoy: String,
}

impl Argon2Hasher {
    pub fn new(cfg: &HashingConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {e}"))?;
        let mut hasher = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            decoy: String::new(),
        };
        // Same cost as real hashes.
        hasher.decoy = hasher.hash(SaltString::generate(&mut OsRng).as_str())?;
        Ok(hasher)
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        Ok(self
            .argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }

    fn verify_decoy(&self, plain: &str) {
        let _ = self.verify(plain, &self.decoy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Argon2Hasher {
        Argon2Hasher::new(&HashingConfig::cheap()).expect("valid params")
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = hasher();
        let password = "Secur3P@ssw0rd!";
        let hash = hasher.hash(password).expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains(password));
        assert!(hasher.verify(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = hasher();
        let hash = hasher.hash("correct-horse-battery-staple").unwrap();
        assert!(!hasher.verify("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = hasher();
        assert_ne!(hasher.hash("hunter22").unwrap(), hasher.hash("hunter22").unwrap());
    }

    #[test]
    fn decoy_uses_configured_cost() {
        let hasher = hasher();
        let decoy = PasswordHash::new(&hasher.decoy).expect("decoy parses");
        assert_eq!(decoy.algorithm.as_str(), "argon2id");
        assert_eq!(decoy.params.get_decimal("m"), Some(8));
        hasher.verify_decoy("anything");
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = hasher().verify("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn rejects_impossible_params() {
        let cfg = HashingConfig {
            memory_kib: 1,
            iterations: 1,
            parallelism: 1,
        };
        assert!(Argon2Hasher::new(&cfg).is_err());
    }
}
