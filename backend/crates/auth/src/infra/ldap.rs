//! LDAP directory binder
//!
//! Proves a directory password with a simple bind over STARTTLS. The
//! account name is placed into a DN template; `UserName` already forbids
//! the characters that would change the DN's structure.

use async_trait::async_trait;
use ldap3::{LdapConnAsync, LdapConnSettings};
use platform::password::ClearTextPassword;

use crate::domain::directory::{DirectoryBinder, DirectoryError};
use crate::domain::value_object::user_name::UserName;

pub const DEFAULT_BIND_DN_TEMPLATE: &str = "uid={username}, ou=People,ou=fcs,o=unb";

/// LDAP result code for bad name or password
const INVALID_CREDENTIALS: u32 = 49;

#[derive(Debug, Clone)]
pub struct LdapConfig {
    /// e.g. `ldap://ldap.example.edu`
    pub url: String,
    /// DN with a `{username}` placeholder
    pub bind_dn_template: String,
    pub starttls: bool,
}

impl LdapConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            bind_dn_template: DEFAULT_BIND_DN_TEMPLATE.to_string(),
            starttls: true,
        }
    }

    pub fn bind_dn(&self, username: &UserName) -> String {
        self.bind_dn_template.replace("{username}", username.as_str())
    }
}

pub struct LdapDirectory {
    config: LdapConfig,
}

impl LdapDirectory {
    pub fn new(config: LdapConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DirectoryBinder for LdapDirectory {
    async fn bind(
        &self,
        username: &UserName,
        password: &ClearTextPassword,
    ) -> Result<(), DirectoryError> {
        // An empty password would be an unauthenticated bind, which succeeds
        if password.expose().is_empty() {
            return Err(DirectoryError::Rejected);
        }

        let settings = LdapConnSettings::new().set_starttls(self.config.starttls);
        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &self.config.url)
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;
        ldap3::drive!(conn);

        let dn = self.config.bind_dn(username);
        let outcome = ldap
            .simple_bind(&dn, password.expose())
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        if let Err(e) = ldap.unbind().await {
            tracing::debug!(error = %e, "LDAP unbind failed");
        }

        match outcome.rc {
            0 => Ok(()),
            INVALID_CREDENTIALS => Err(DirectoryError::Rejected),
            rc => {
                tracing::warn!(rc, text = %outcome.text, "Unexpected LDAP bind result");
                Err(DirectoryError::Rejected)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_dn_template() {
        let config = LdapConfig::new("ldap://localhost");
        let name = UserName::new("jsmith").unwrap();
        assert_eq!(config.bind_dn(&name), "uid=jsmith, ou=People,ou=fcs,o=unb");
    }

    #[tokio::test]
    async fn test_empty_password_never_binds() {
        let directory = LdapDirectory::new(LdapConfig::new("ldap://127.0.0.1:1"));
        let result = directory
            .bind(
                &UserName::new("jsmith").unwrap(),
                &ClearTextPassword::verbatim(String::new()),
            )
            .await;
        assert!(matches!(result, Err(DirectoryError::Rejected)));
    }
}
