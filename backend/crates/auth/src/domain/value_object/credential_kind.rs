//! Credential Kind Value Object
//!
//! Where an account's password is checked: against the local hash or by a
//! bind to the external directory.

use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    #[display("local")]
    Local,
    #[default]
    #[display("ldap")]
    Ldap,
}

impl CredentialKind {
    /// Database / wire code
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::Local => "local",
            CredentialKind::Ldap => "ldap",
        }
    }

    /// Parse a login `type` field; anything other than "local" is a directory login
    pub fn from_login_type(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("local") => CredentialKind::Local,
            _ => CredentialKind::Ldap,
        }
    }

    /// Parse a stored code
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "local" => Some(CredentialKind::Local),
            "ldap" => Some(CredentialKind::Ldap),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_type_defaults_to_directory() {
        assert_eq!(CredentialKind::from_login_type(None), CredentialKind::Ldap);
        assert_eq!(CredentialKind::from_login_type(Some("ldap")), CredentialKind::Ldap);
        assert_eq!(CredentialKind::from_login_type(Some("other")), CredentialKind::Ldap);
        assert_eq!(CredentialKind::from_login_type(Some("Local")), CredentialKind::Local);
    }

    #[test]
    fn test_display_matches_db_code() {
        assert_eq!(CredentialKind::Local.to_string(), "local");
        assert_eq!(CredentialKind::from_db("ldap"), Some(CredentialKind::Ldap));
        assert_eq!(CredentialKind::from_db("x"), None);
    }
}
