//! Utility functions: email handling, code generation and subject ids.

use crate::error::{ProofPassError, Result};
use alloy_primitives::{U256, keccak256};
use rand::Rng;
use rand::rngs::OsRng;

/// Validate email address format.
///
/// This performs basic RFC 5322 validation:
/// - Must contain exactly one `@`
/// - Must have non-empty local and domain parts
/// - Length must be between 3 and 255 characters
///
/// # Examples
///
/// ```
/// use proofpass_auth::utils::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("user+tag@subdomain.example.com"));
/// assert!(!is_valid_email("invalid"));
/// assert!(!is_valid_email("@example.com"));
/// assert!(!is_valid_email("user@"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    // Domain must contain at least one dot
    if !domain.contains('.') {
        return false;
    }

    let valid_local_chars =
        |c: char| c.is_alphanumeric() || c == '.' || c == '-' || c == '+' || c == '_';

    let valid_domain_chars = |c: char| c.is_alphanumeric() || c == '.' || c == '-';

    if !local.chars().all(valid_local_chars) || !domain.chars().all(valid_domain_chars) {
        return false;
    }

    // Domain parts between dots must be non-empty
    domain.split('.').all(|part| !part.is_empty())
}

/// Trim and lowercase an email so that one address maps to one user.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalize and validate an email.
///
/// # Errors
///
/// Returns [`ProofPassError::Validation`] if the address is malformed.
pub fn validate_email(email: &str) -> Result<String> {
    let email = normalize_email(email);
    if is_valid_email(&email) {
        Ok(email)
    } else {
        Err(ProofPassError::Validation("invalid email address".to_string()))
    }
}

/// Reject empty or whitespace-only fields.
///
/// # Errors
///
/// Returns [`ProofPassError::Validation`] naming the field.
pub fn require_non_empty(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ProofPassError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Generate a decimal code of `digits` digits from the OS random source.
///
/// Every digit is drawn uniformly; leading zeros are kept.
#[must_use]
pub fn generate_numeric_code(digits: usize) -> String {
    let mut rng = OsRng;
    (0..digits)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Per-identity subject id sent to the issuer.
///
/// The low 248 bits of `keccak256(email)` rendered in decimal: stable for an
/// address and fits in a field element.
#[must_use]
pub fn subject_id(email: &str) -> String {
    let mut bytes = keccak256(email.as_bytes()).0;
    bytes[0] = 0;
    U256::from_be_bytes(bytes).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proofpass_testing::properties::{missing_at_sign, valid_email};

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user.name@example.com"));
        assert!(is_valid_email("user+tag@example.com"));
        assert!(is_valid_email("user_name@subdomain.example.com"));
        assert!(is_valid_email("user-name@example.co.uk"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("invalid"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@example."));
        assert!(!is_valid_email("user@example..com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_validate_email_normalizes() {
        assert_eq!(validate_email("  A@B.com ").ok().as_deref(), Some("a@b.com"));
        assert!(matches!(
            validate_email("nope"),
            Err(ProofPassError::Validation(_))
        ));
    }

    #[test]
    fn test_subject_id_is_stable_and_below_2_pow_248() {
        let a = subject_id("a@b.com");
        assert_eq!(a, subject_id("a@b.com"));
        assert_ne!(a, subject_id("c@d.com"));

        let value: U256 = a.parse().unwrap_or_default();
        assert!(value < (U256::from(1u8) << 248));
    }

    proptest! {
        #[test]
        fn prop_code_is_fixed_width_decimal(digits in 1usize..12) {
            let code = generate_numeric_code(digits);
            prop_assert_eq!(code.len(), digits);
            prop_assert!(code.chars().all(|c| c.is_ascii_digit()));
        }

        #[test]
        fn prop_generated_emails_validate(email in valid_email()) {
            prop_assert!(is_valid_email(&email));
        }

        #[test]
        fn prop_emails_without_at_sign_rejected(input in missing_at_sign()) {
            prop_assert!(!is_valid_email(&input));
        }

        #[test]
        fn prop_subject_id_deterministic(email in valid_email()) {
            prop_assert_eq!(subject_id(&email), subject_id(&email));
        }
    }
}
