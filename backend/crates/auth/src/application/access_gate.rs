//! Access Gate
//!
//! Guards are data; [`AccessGate::check`] runs them in order and stops at
//! the first failure, before the caller has touched anything.

use std::sync::Arc;

use crate::application::check_session::Identity;
use crate::domain::entity::account::Account;
use crate::domain::repository::{AccountRepository, OwnershipRepository, ResourceKind};
use crate::error::{AuthError, AuthResult};

/// A single admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// A live session
    Authenticated,
    /// Email or mobile verified
    Verified,
    /// The session account owns the resource; `id` is `None` when the
    /// request did not name one
    Owns { kind: ResourceKind, id: Option<i64> },
}

impl Guard {
    pub fn owns(kind: ResourceKind, id: i64) -> Self {
        Guard::Owns { kind, id: Some(id) }
    }
}

/// Authenticated, then Verified
pub const VERIFIED: &[Guard] = &[Guard::Authenticated, Guard::Verified];

/// What a passed pipeline hands to the operation
#[derive(Debug, Clone)]
pub struct Admitted {
    pub identity: Identity,
    /// Loaded by the first guard that needed it
    pub account: Option<Account>,
}

pub struct AccessGate<A, O>
where
    A: AccountRepository,
    O: OwnershipRepository,
{
    accounts: Arc<A>,
    owners: Arc<O>,
}

impl<A, O> AccessGate<A, O>
where
    A: AccountRepository,
    O: OwnershipRepository,
{
    pub fn new(accounts: Arc<A>, owners: Arc<O>) -> Self {
        Self { accounts, owners }
    }

    /// Run the guards in order. Every guard implies a session, so an
    /// anonymous caller fails with `Unauthenticated` whatever the list.
    pub async fn check(
        &self,
        identity: Option<&Identity>,
        guards: &[Guard],
    ) -> AuthResult<Admitted> {
        let identity = identity.ok_or(AuthError::Unauthenticated)?;
        let mut admitted = Admitted {
            identity: identity.clone(),
            account: None,
        };

        for guard in guards {
            match *guard {
                Guard::Authenticated => {}
                Guard::Verified => {
                    let account = self.load_account(&mut admitted).await?;
                    if !account.is_verified() {
                        return Err(AuthError::VerificationRequired);
                    }
                }
                Guard::Owns { kind, id } => {
                    self.load_account(&mut admitted).await?;
                    self.check_owner(identity, kind, id).await?;
                }
            }
        }

        Ok(admitted)
    }

    async fn load_account<'a>(&self, admitted: &'a mut Admitted) -> AuthResult<&'a Account> {
        if admitted.account.is_none() {
            let account = self
                .accounts
                .find_account(admitted.identity.account_id)
                .await?
                .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;
            admitted.account = Some(account);
        }

        admitted
            .account
            .as_ref()
            .ok_or_else(|| AuthError::Internal("account not loaded".to_string()))
    }

    async fn check_owner(
        &self,
        identity: &Identity,
        kind: ResourceKind,
        id: Option<i64>,
    ) -> AuthResult<()> {
        let not_found = || AuthError::NotFound(format!("{} not found", kind.label()));

        let id = id.ok_or_else(not_found)?;
        let owner = self.owners.owner_of(kind, id).await?.ok_or_else(not_found)?;

        if owner != identity.account_id {
            tracing::debug!(
                account_id = %identity.account_id,
                resource = kind.label(),
                id,
                "Ownership check failed"
            );
            return Err(AuthError::Forbidden(format!(
                "You do not have permission to modify this {}",
                kind.label().to_lowercase()
            )));
        }

        Ok(())
    }
}
