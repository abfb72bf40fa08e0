//! Password hashing with Argon2id

use argon2::{
    password_hash::{
        rand_core::OsRng,
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use tracing::{debug, warn};

use crate::shared::error::{PlatformError, Result};

/// Password length bounds
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            max_length: 128,
        }
    }
}

impl PasswordPolicy {
    pub fn validate(&self, password: &str) -> Result<()> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(PlatformError::validation(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }
        if length > self.max_length {
            return Err(PlatformError::validation(format!(
                "Password must be at most {} characters",
                self.max_length
            )));
        }
        Ok(())
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone)]
pub struct Argon2Config {
    /// Memory cost in KiB
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: 19456, // 19 MiB
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl Argon2Config {
    /// Cheap parameters for tests
    pub fn testing() -> Self {
        Self {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    fn to_params(&self) -> Result<Params> {
        Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| PlatformError::internal(format!("Invalid Argon2 params: {}", e)))
    }
}

pub struct PasswordService {
    argon2: Argon2<'static>,
    policy: PasswordPolicy,
    /// Hash verified against when a login names an unknown user, so both
    /// failure paths cost the same
    decoy_hash: String,
}

impl PasswordService {
    pub fn new(config: Argon2Config, policy: PasswordPolicy) -> Result<Self> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, config.to_params()?);
        let decoy_hash = Self::hash_with(&argon2, "decoy-password")?;

        Ok(Self { argon2, policy, decoy_hash })
    }

    fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PlatformError::internal(format!("Failed to hash password: {}", e)))
    }

    /// Validate against the policy, then hash into a PHC string
    pub fn hash_password(&self, password: &str) -> Result<String> {
        self.policy.validate(password)?;
        let hash = Self::hash_with(&self.argon2, password)?;
        debug!("Password hashed");
        Ok(hash)
    }

    /// Verify a password against a stored PHC string. A mismatch is `Ok(false)`.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            PlatformError::internal(format!("Invalid password hash format: {}", e))
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PlatformError::internal(format!(
                "Password verification error: {}",
                e
            ))),
        }
    }

    /// Burn one verification for a login against an unknown username
    pub fn verify_decoy(&self, password: &str) {
        if let Err(e) = self.verify_password(password, &self.decoy_hash) {
            warn!(error = %e, "Decoy password verification failed");
        }
    }

    pub fn validate_password(&self, password: &str) -> Result<()> {
        self.policy.validate(password)
    }
}
