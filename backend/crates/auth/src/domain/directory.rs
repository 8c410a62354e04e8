//! Directory Binder
//!
//! The external directory is the password authority for `ldap` accounts;
//! a successful simple bind is the only proof accepted.

use async_trait::async_trait;
use platform::password::ClearTextPassword;
use thiserror::Error;

use crate::domain::value_object::user_name::UserName;

#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Bad name or password
    #[error("directory rejected the credentials")]
    Rejected,

    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait DirectoryBinder: Send + Sync {
    async fn bind(&self, username: &UserName, password: &ClearTextPassword)
    -> Result<(), DirectoryError>;
}

/// Binder used when no directory is configured; every bind fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledDirectory;

#[async_trait]
impl DirectoryBinder for DisabledDirectory {
    async fn bind(
        &self,
        username: &UserName,
        _password: &ClearTextPassword,
    ) -> Result<(), DirectoryError> {
        tracing::warn!(username = %username, "Directory not configured, refusing bind");
        Err(DirectoryError::Unavailable("not configured".to_string()))
    }
}
