//! Sign Out Use Case

use std::sync::Arc;

use crate::application::check_session::Identity;
use crate::domain::repository::SessionRepository;
use crate::error::AuthResult;

pub struct SignOutUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    /// Destroy the caller's session; deleting a row that is already gone is fine
    pub async fn execute(&self, identity: &Identity) -> AuthResult<()> {
        self.session_repo.delete_session(identity.session_id).await?;

        tracing::info!(
            account_id = %identity.account_id,
            session_id = %identity.session_id,
            "User signed out"
        );

        Ok(())
    }
}
