//! Password policy and hashing cost configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Password policy and Argon2id cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Minimum password length in characters.
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Require upper case, lower case, a digit, and a special character.
    #[serde(default = "default_true")]
    pub require_mixed_case_digit_special: bool,
    /// Minimum zxcvbn score (0–4). `None` disables the entropy check.
    #[serde(default)]
    pub min_strength_score: Option<u8>,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Argon2 lane count.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            require_mixed_case_digit_special: true,
            min_strength_score: None,
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl PasswordConfig {
    /// Rejects out-of-range policy values.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.min_length == 0 {
            return Err(AppError::configuration(
                "password.min_length must be at least 1",
            ));
        }
        if let Some(score) = self.min_strength_score {
            if score > 4 {
                return Err(AppError::configuration(
                    "password.min_strength_score must be between 0 and 4",
                ));
            }
        }
        if self.iterations == 0 || self.parallelism == 0 {
            return Err(AppError::configuration(
                "password hashing iterations and parallelism must be positive",
            ));
        }
        Ok(())
    }
}

fn default_min_length() -> usize {
    8
}

fn default_true() -> bool {
    true
}

fn default_memory_kib() -> u32 {
    19_456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
