//! Email syntax validation.

use validator::ValidateEmail;

/// Whether `email` is a syntactically valid address with a dotted domain.
pub fn validate_email(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() || !email.validate_email() {
        return false;
    }
    match email.rsplit_once('@') {
        Some((_, domain)) => domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    }
}
