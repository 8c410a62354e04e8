//! Sign In Use Case
//!
//! Authenticates a user and creates a session. Unknown user, wrong
//! password, wrong credential kind and a failed directory bind are all
//! reported as the same `InvalidCredentials`.

use std::sync::Arc;

use platform::password::ClearTextPassword;
use platform::sanitize::sanitize_text;

use crate::application::config::AuthConfig;
use crate::application::outbound::Outbound;
use crate::domain::entity::{account::Account, session::Session};
use crate::domain::repository::{AccountRepository, SessionRepository};
use crate::domain::value_object::{
    credential_kind::CredentialKind, session_token::SessionToken, user_name::UserName,
};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub username: String,
    pub password: String,
    pub kind: CredentialKind,
}

/// Sign in output
pub struct SignInOutput {
    /// Session token for cookie
    pub session_token: SessionToken,
    pub account: Account,
}

/// Sign in use case
pub struct SignInUseCase<R>
where
    R: AccountRepository + SessionRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
    outbound: Outbound,
}

impl<R> SignInUseCase<R>
where
    R: AccountRepository + SessionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>, outbound: Outbound) -> Self {
        Self {
            repo,
            config,
            outbound,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let username = sanitize_text(&input.username);
        if username.is_empty() {
            return Err(AuthError::Validation(
                "Username is required after sanitization".to_string(),
            ));
        }

        let username = UserName::new(&username).map_err(|_| AuthError::InvalidCredentials)?;
        let account = match input.kind {
            CredentialKind::Local => {
                let password = ClearTextPassword::unchecked(input.password);
                self.authenticate_local(&username, &password).await?
            }
            CredentialKind::Ldap => {
                let password = ClearTextPassword::verbatim(input.password);
                self.authenticate_directory(&username, &password).await?
            }
        };

        let session = Session::new(
            account.id,
            account.username.clone(),
            account.credential_kind,
            self.config.session_lifetime(),
        );
        self.repo.create_session(&session).await?;

        let session_token = SessionToken::sign(session.session_id, &self.config.session_secret)
            .map_err(|e| AuthError::Internal(format!("Session signing failed: {}", e)))?;

        tracing::info!(
            account_id = %account.id,
            session_id = %session.session_id,
            kind = %account.credential_kind,
            "User signed in"
        );

        Ok(SignInOutput {
            session_token,
            account,
        })
    }

    async fn authenticate_local(
        &self,
        username: &UserName,
        password: &ClearTextPassword,
    ) -> AuthResult<Account> {
        let account = self
            .repo
            .find_account_by_username(username)
            .await?
            .filter(|a| a.credential_kind == CredentialKind::Local)
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = self
            .repo
            .password_hash(account.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !hash.verify(password, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(account)
    }

    async fn authenticate_directory(
        &self,
        username: &UserName,
        password: &ClearTextPassword,
    ) -> AuthResult<Account> {
        // A local account owns this name; the directory may not claim it
        if let Some(existing) = self.repo.find_account_by_username(username).await? {
            if existing.credential_kind != CredentialKind::Ldap {
                return Err(AuthError::InvalidCredentials);
            }
        }

        if let Err(e) = self.outbound.directory.bind(username, password).await {
            tracing::debug!(username = %username, error = %e, "Directory bind failed");
            return Err(AuthError::InvalidCredentials);
        }

        self.repo.provision_directory_account(username).await
    }
}
