//! In-memory repository
//!
//! Implements every auth repository trait over one mutex-guarded state.
//! Code consumption checks and marks under a single lock acquisition, so
//! concurrent consumers race exactly as they do against PostgreSQL.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::password::HashedPassword;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::entity::{
    account::{Account, NewAccount},
    notification_preference::{NotificationPreference, Recipient},
    one_time_code::OneTimeCode,
    session::Session,
};
use crate::domain::repository::{
    AccountRepository, CodeSelector, ConsumeEffect, OtpRepository, PreferenceRepository,
    SessionRepository,
};
use crate::domain::value_object::{
    credential_kind::CredentialKind, email::Email, otp::OtpPurpose, phone_number::PhoneNumber,
    user_name::UserName,
};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    next_id: i64,
    accounts: Vec<Account>,
    credentials: HashMap<AccountId, HashedPassword>,
    codes: Vec<OneTimeCode>,
    sessions: HashMap<Uuid, Session>,
    preferences: HashMap<AccountId, NotificationPreference>,
}

impl State {
    fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    fn account_mut(&mut self, id: AccountId) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.id == id)
    }

    fn insert_account(&mut self, new: &NewAccount) -> AuthResult<Account> {
        if self.accounts.iter().any(|a| a.username == new.username) {
            return Err(AuthError::Conflict("Username already exists".to_string()));
        }
        if let Some(email) = &new.email {
            if self.accounts.iter().any(|a| a.email.as_ref() == Some(email)) {
                return Err(AuthError::Conflict(
                    "Email address already in use".to_string(),
                ));
            }
        }

        self.next_id += 1;
        let now = Utc::now();
        let account = Account {
            id: AccountId::new(self.next_id),
            username: new.username.clone(),
            email: new.email.clone(),
            phone: None,
            credential_kind: new.credential_kind,
            email_verified: false,
            mobile_verified: false,
            pending_email: None,
            pending_phone: None,
            created_at: now,
            updated_at: now,
        };

        if let Some(hash) = &new.password_hash {
            self.credentials.insert(account.id, hash.clone());
        }
        self.accounts.push(account.clone());

        Ok(account)
    }

    /// Index of the newest live code matching the selector
    fn live_code(&self, selector: &CodeSelector, purpose: OtpPurpose) -> Option<usize> {
        let now = Utc::now();
        self.codes
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                c.purpose == purpose
                    && &c.code_digest == selector.digest()
                    && selector.account().is_none_or(|id| id == c.account_id)
                    && c.is_live(now)
            })
            .max_by_key(|(_, c)| c.created_at)
            .map(|(i, _)| i)
    }

    fn recipient(&self, account: &Account) -> Option<Recipient> {
        account.email.clone().map(|email| Recipient {
            account_id: account.id,
            username: account.username.clone(),
            email,
        })
    }

    fn prefs(&self, id: AccountId) -> NotificationPreference {
        self.preferences.get(&id).copied().unwrap_or_default()
    }
}

/// In-memory store for tests and local experiments
#[derive(Clone, Default)]
pub struct InMemoryAuthStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an account verified directly
    pub async fn force_verify(&self, id: AccountId) {
        if let Some(account) = self.state.lock().await.account_mut(id) {
            account.email_verified = true;
        }
    }

    /// Move a stored code's expiry, for exercising the window
    pub async fn set_code_expiry(&self, id: AccountId, purpose: OtpPurpose, at: DateTime<Utc>) {
        let mut state = self.state.lock().await;
        for code in state
            .codes
            .iter_mut()
            .filter(|c| c.account_id == id && c.purpose == purpose)
        {
            code.expires_at = at;
        }
    }

    /// Drop a credential row, for exercising a failed password replacement
    pub async fn remove_credential(&self, id: AccountId) {
        self.state.lock().await.credentials.remove(&id);
    }

    pub async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }
}

impl AccountRepository for InMemoryAuthStore {
    async fn create_account(&self, account: &NewAccount) -> AuthResult<Account> {
        self.state.lock().await.insert_account(account)
    }

    async fn find_account(&self, id: AccountId) -> AuthResult<Option<Account>> {
        Ok(self.state.lock().await.account(id).cloned())
    }

    async fn find_account_by_username(&self, username: &UserName) -> AuthResult<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state.accounts.iter().find(|a| &a.username == username).cloned())
    }

    async fn find_account_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .iter()
            .find(|a| a.email.as_ref() == Some(email))
            .cloned())
    }

    async fn find_account_by_phone(&self, phone: &PhoneNumber) -> AuthResult<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .iter()
            .find(|a| a.phone.as_ref() == Some(phone))
            .cloned())
    }

    async fn password_hash(&self, id: AccountId) -> AuthResult<Option<HashedPassword>> {
        Ok(self.state.lock().await.credentials.get(&id).cloned())
    }

    async fn provision_directory_account(&self, username: &UserName) -> AuthResult<Account> {
        let mut state = self.state.lock().await;

        if let Some(existing) = state.accounts.iter().find(|a| &a.username == username) {
            if existing.credential_kind != CredentialKind::Ldap {
                return Err(AuthError::InvalidCredentials);
            }
            return Ok(existing.clone());
        }

        state.insert_account(&NewAccount::directory(username.clone()))
    }

    async fn set_pending_email(&self, id: AccountId, email: &Email) -> AuthResult<()> {
        if let Some(account) = self.state.lock().await.account_mut(id) {
            account.pending_email = Some(email.clone());
            account.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_pending_phone(&self, id: AccountId, phone: &PhoneNumber) -> AuthResult<()> {
        if let Some(account) = self.state.lock().await.account_mut(id) {
            account.pending_phone = Some(phone.clone());
            account.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list_accounts(&self, limit: i64, offset: i64) -> AuthResult<Vec<Account>> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

impl OtpRepository for InMemoryAuthStore {
    async fn store_code(&self, code: &OneTimeCode) -> AuthResult<()> {
        let mut state = self.state.lock().await;
        state
            .codes
            .retain(|c| !(c.account_id == code.account_id && c.purpose == code.purpose));
        state.codes.push(code.clone());
        Ok(())
    }

    async fn consume_code(
        &self,
        selector: &CodeSelector,
        effect: &ConsumeEffect,
    ) -> AuthResult<Option<Account>> {
        let mut state = self.state.lock().await;

        let Some(index) = state.live_code(selector, effect.purpose()) else {
            return Ok(None);
        };
        let account_id = state.codes[index].account_id;

        // Apply the effect first; on failure nothing has been marked
        match effect {
            ConsumeEffect::VerifyEmail => {
                let promoted = state
                    .account(account_id)
                    .and_then(|a| a.pending_email.clone());
                if let Some(email) = &promoted {
                    if state
                        .accounts
                        .iter()
                        .any(|a| a.id != account_id && a.email.as_ref() == Some(email))
                    {
                        return Err(AuthError::Conflict(
                            "Email address already in use".to_string(),
                        ));
                    }
                }
                let account = state
                    .account_mut(account_id)
                    .ok_or_else(|| AuthError::Internal("Code owner missing".to_string()))?;
                if let Some(email) = promoted {
                    account.email = Some(email);
                }
                account.pending_email = None;
                account.email_verified = true;
                account.updated_at = Utc::now();
            }
            ConsumeEffect::VerifyMobile => {
                let promoted = state
                    .account(account_id)
                    .and_then(|a| a.pending_phone.clone());
                if let Some(phone) = &promoted {
                    if state
                        .accounts
                        .iter()
                        .any(|a| a.id != account_id && a.phone.as_ref() == Some(phone))
                    {
                        return Err(AuthError::Conflict(
                            "Phone number is already in use by another account".to_string(),
                        ));
                    }
                }
                let account = state
                    .account_mut(account_id)
                    .ok_or_else(|| AuthError::Internal("Code owner missing".to_string()))?;
                if let Some(phone) = promoted {
                    account.phone = Some(phone);
                }
                account.pending_phone = None;
                account.mobile_verified = true;
                account.updated_at = Utc::now();
            }
            ConsumeEffect::ReplacePassword(hash) => {
                let Some(slot) = state.credentials.get_mut(&account_id) else {
                    return Err(AuthError::Internal(
                        "No local credential to replace".to_string(),
                    ));
                };
                *slot = hash.clone();
            }
        }

        state.codes[index].consumed_at = Some(Utc::now());
        Ok(state.account(account_id).cloned())
    }

    async fn peek_code(
        &self,
        selector: &CodeSelector,
        purpose: OtpPurpose,
    ) -> AuthResult<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state
            .live_code(selector, purpose)
            .and_then(|i| state.account(state.codes[i].account_id))
            .cloned())
    }

    async fn purge_stale_codes(&self, older_than: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.codes.len();
        state.codes.retain(|c| c.expires_at >= older_than);
        Ok((before - state.codes.len()) as u64)
    }
}

impl SessionRepository for InMemoryAuthStore {
    async fn create_session(&self, session: &Session) -> AuthResult<()> {
        self.state
            .lock()
            .await
            .sessions
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_session(&self, session_id: Uuid) -> AuthResult<Option<Session>> {
        Ok(self.state.lock().await.sessions.get(&session_id).cloned())
    }

    async fn touch_session(&self, session_id: Uuid) -> AuthResult<()> {
        if let Some(session) = self.state.lock().await.sessions.get_mut(&session_id) {
            session.touch();
        }
        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> AuthResult<()> {
        self.state.lock().await.sessions.remove(&session_id);
        Ok(())
    }

    async fn delete_sessions_for(&self, account_id: AccountId) -> AuthResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.account_id != account_id);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn purge_expired_sessions(&self) -> AuthResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| !s.is_expired());
        Ok((before - state.sessions.len()) as u64)
    }
}

impl PreferenceRepository for InMemoryAuthStore {
    async fn preferences(&self, account_id: AccountId) -> AuthResult<NotificationPreference> {
        Ok(self.state.lock().await.prefs(account_id))
    }

    async fn update_preferences(
        &self,
        account_id: AccountId,
        preferences: NotificationPreference,
    ) -> AuthResult<()> {
        self.state
            .lock()
            .await
            .preferences
            .insert(account_id, preferences);
        Ok(())
    }

    async fn blog_subscribers(&self, except: AccountId) -> AuthResult<Vec<Recipient>> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .iter()
            .filter(|a| a.id != except && state.prefs(a.id).notify_on_blog)
            .filter_map(|a| state.recipient(a))
            .collect())
    }

    async fn comment_subscriber(&self, account_id: AccountId) -> AuthResult<Option<Recipient>> {
        let state = self.state.lock().await;
        Ok(state
            .account(account_id)
            .filter(|a| state.prefs(a.id).notify_on_comment)
            .and_then(|a| state.recipient(a)))
    }
}
