//! Password policy enforcement for new passwords.

use serde::{Deserialize, Serialize};

use beautydesk_core::config::PasswordConfig;

/// Outcome of a password policy check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCheck {
    /// Whether every rule passed.
    pub is_valid: bool,
    /// One message per failed rule, in rule order.
    pub errors: Vec<String>,
}

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
    require_mixed_case_digit_special: bool,
    min_strength_score: Option<u8>,
}

impl PasswordValidator {
    /// Creates a new validator from password configuration.
    pub fn new(config: &PasswordConfig) -> Self {
        Self {
            min_length: config.min_length,
            require_mixed_case_digit_special: config.require_mixed_case_digit_special,
            min_strength_score: config.min_strength_score,
        }
    }

    /// Checks a password against every rule and reports all violations.
    pub fn validate(&self, password: &str) -> PasswordCheck {
        let mut errors = Vec::new();

        if password.chars().count() < self.min_length {
            errors.push(format!(
                "Password must be at least {} characters long",
                self.min_length
            ));
        }

        if self.require_mixed_case_digit_special {
            if !password.chars().any(|c| c.is_uppercase()) {
                errors.push("Password must contain at least one uppercase letter".to_string());
            }
            if !password.chars().any(|c| c.is_lowercase()) {
                errors.push("Password must contain at least one lowercase letter".to_string());
            }
            if !password.chars().any(|c| c.is_ascii_digit()) {
                errors.push("Password must contain at least one number".to_string());
            }
            if !password
                .chars()
                .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
            {
                errors.push("Password must contain at least one special character".to_string());
            }
        }

        if let Some(min_score) = self.min_strength_score {
            if !password.is_empty() && strength_score(password) < min_score {
                errors.push(
                    "Password is too easy to guess. Please use a less predictable password."
                        .to_string(),
                );
            }
        }

        PasswordCheck {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

impl Default for PasswordValidator {
    fn default() -> Self {
        Self::new(&PasswordConfig::default())
    }
}

/// Checks a password against the default policy.
pub fn validate_password(password: &str) -> PasswordCheck {
    PasswordValidator::default().validate(password)
}

fn strength_score(password: &str) -> u8 {
    match zxcvbn::zxcvbn(password, &[]).score() {
        zxcvbn::Score::Zero => 0,
        zxcvbn::Score::One => 1,
        zxcvbn::Score::Two => 2,
        zxcvbn::Score::Three => 3,
        _ => 4,
    }
}
