//! Check Session Use Case
//!
//! Maps a cookie token to the identity it stands for.

use std::sync::Arc;

use kernel::id::AccountId;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::{
    credential_kind::CredentialKind, session_token::SessionToken, user_name::UserName,
};
use crate::error::AuthResult;

/// The caller, as established by a live session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub session_id: Uuid,
    pub account_id: AccountId,
    pub username: UserName,
    pub credential_kind: CredentialKind,
}

/// Check session use case
pub struct CheckSessionUseCase<S>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> CheckSessionUseCase<S>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Resolve a token. A bad signature, an unknown session or an expired
    /// one all yield `None`; expired rows are deleted on the way.
    pub async fn resolve(&self, session_token: &str) -> AuthResult<Option<Identity>> {
        let Some(session_id) = SessionToken::verify(session_token, &self.config.session_secret)
        else {
            tracing::debug!("Session token signature mismatch");
            return Ok(None);
        };

        let Some(session) = self.session_repo.find_session(session_id).await? else {
            return Ok(None);
        };

        if session.is_expired() {
            self.session_repo.delete_session(session_id).await?;
            return Ok(None);
        }

        // Update in background
        let repo = self.session_repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.touch_session(session_id).await {
                tracing::warn!(error = %e, "Failed to update session activity");
            }
        });

        Ok(Some(Identity {
            session_id: session.session_id,
            account_id: session.account_id,
            username: session.username,
            credential_kind: session.credential_kind,
        }))
    }
}
