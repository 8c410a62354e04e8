//! Sign Up Use Case
//!
//! Creates a local account and sends the first email verification code.

use std::sync::Arc;

use kernel::id::AccountId;
use platform::password::ClearTextPassword;
use platform::sanitize::sanitize_text;

use crate::application::config::AuthConfig;
use crate::application::otp_ledger::OtpLedger;
use crate::application::outbound::{Outbound, verification_email};
use crate::domain::entity::account::NewAccount;
use crate::domain::repository::{AccountRepository, OtpRepository};
use crate::domain::value_object::{email::Email, otp::OtpPurpose, user_name::UserName};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Sign up output
pub struct SignUpOutput {
    pub account_id: AccountId,
    pub username: UserName,
    pub email: Email,
}

/// Sign up use case
pub struct SignUpUseCase<R>
where
    R: AccountRepository + OtpRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
    outbound: Outbound,
}

impl<R> SignUpUseCase<R>
where
    R: AccountRepository + OtpRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>, outbound: Outbound) -> Self {
        Self {
            repo,
            config,
            outbound,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let username = sanitize_text(&input.username);
        let email = sanitize_text(&input.email);

        if username.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation(
                "All fields are required after sanitization".to_string(),
            ));
        }

        let email = Email::new(email)?;
        let password = ClearTextPassword::new(input.password)?;
        let username = UserName::new(&username)?;

        if self.repo.find_account_by_username(&username).await?.is_some() {
            return Err(AuthError::Conflict("Username already exists".to_string()));
        }
        if self.repo.find_account_by_email(&email).await?.is_some() {
            return Err(AuthError::Conflict(
                "Email address already in use".to_string(),
            ));
        }

        let password_hash = password.hash(self.config.pepper())?;

        // The store re-checks uniqueness; a racing registration still ends in Conflict
        let account = self
            .repo
            .create_account(&NewAccount::local(username, email.clone(), password_hash))
            .await?;

        let ledger = OtpLedger::new(self.repo.clone(), self.config.clone());
        let code = ledger.issue(account.id, OtpPurpose::EmailVerify).await?;
        self.outbound
            .dispatch_email(verification_email(email.as_str(), &account.username, &code));

        tracing::info!(
            account_id = %account.id,
            username = %account.username,
            "User signed up"
        );

        Ok(SignUpOutput {
            account_id: account.id,
            username: account.username,
            email,
        })
    }
}
