//! User Name Value Object
//!
//! The login handle. Local accounts pick one at registration; directory
//! accounts take the name they bound with, so the rules here must also be
//! safe to interpolate into a directory DN.
//!
//! ## Invariants
//! - NFKC normalized, surrounding whitespace trimmed
//! - Length: 1..=64 characters
//! - No inner whitespace, control characters or DN special characters
//! - Case preserved

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

use crate::error::{AuthError, AuthResult};

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 64;

/// Characters with special meaning inside a distinguished name
const DN_SPECIAL_CHARS: &[char] = &[',', '=', '+', '<', '>', '#', ';', '"', '\\'];

/// User name value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    /// Normalize and validate a submitted user name
    pub fn new(raw: &str) -> AuthResult<Self> {
        let normalized: String = raw.nfkc().collect();
        let trimmed = normalized.trim();

        if trimmed.is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }

        if trimmed.chars().count() > USER_NAME_MAX_LENGTH {
            return Err(AuthError::Validation(format!(
                "Username must be at most {} characters",
                USER_NAME_MAX_LENGTH
            )));
        }

        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || DN_SPECIAL_CHARS.contains(&c))
        {
            return Err(AuthError::Validation(
                "Username contains invalid characters".to_string(),
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_name_trims_and_preserves_case() {
        let name = UserName::new("  JSmith ").unwrap();
        assert_eq!(name.as_str(), "JSmith");
    }

    #[test]
    fn test_user_name_nfkc() {
        // Fullwidth letters fold to ASCII
        let name = UserName::new("ｊｓｍｉｔｈ").unwrap();
        assert_eq!(name.as_str(), "jsmith");
    }

    #[test]
    fn test_user_name_rejects_empty_and_long() {
        assert!(UserName::new("   ").is_err());
        assert!(UserName::new(&"a".repeat(USER_NAME_MAX_LENGTH + 1)).is_err());
        assert!(UserName::new(&"a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_user_name_rejects_dn_specials() {
        for bad in ["a,b", "uid=x", "a+b", "a;b", "a\"b", "a\\b", "a b", "a\tb"] {
            assert!(UserName::new(bad).is_err(), "{bad} should be rejected");
        }
    }
}
