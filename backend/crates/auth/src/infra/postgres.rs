//! PostgreSQL Repository Implementations

use chrono::{DateTime, Duration, Utc};
use kernel::error::conversions::is_unique_violation;
use kernel::id::AccountId;
use platform::password::HashedPassword;
use sqlx::{PgPool, Postgres, Transaction};
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

const ACCOUNT_COLUMNS: &str = "id, username, email, phone_number, credential_kind, \
     email_verified, mobile_verified, pending_email, pending_phone, created_at, updated_at";

/// How long a dead code row is kept before the sweep removes it
const STALE_CODE_AGE_HOURS: i64 = 24;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Startup housekeeping: expired sessions and long-dead codes
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let sessions = self.purge_expired_sessions().await?;
        let codes = self
            .purge_stale_codes(Utc::now() - Duration::hours(STALE_CODE_AGE_HOURS))
            .await?;

        tracing::info!(
            sessions_deleted = sessions,
            codes_deleted = codes,
            "Cleaned up expired auth rows"
        );

        Ok(sessions + codes)
    }

    async fn account_in(
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
    ) -> AuthResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn fetch_account(&self, filter: &str, value: &str) -> AuthResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {filter} = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }
}

/// Turn a unique violation into a Conflict naming the taken field
fn conflict_or_db(err: sqlx::Error) -> AuthError {
    if !is_unique_violation(&err) {
        return AuthError::Database(err);
    }

    let constraint = match &err {
        sqlx::Error::Database(db_err) => db_err.constraint().unwrap_or_default().to_string(),
        _ => String::new(),
    };

    let message = match constraint.as_str() {
        "accounts_username_key" => "Username already exists",
        "accounts_email_key" => "Email address already in use",
        "accounts_phone_number_key" => "Phone number is already in use by another account",
        _ => "Duplicate key value",
    };

    AuthError::Conflict(message.to_string())
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

impl AccountRepository for PgAuthRepository {
    async fn create_account(&self, account: &NewAccount) -> AuthResult<Account> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO accounts (username, email, credential_kind) \
             VALUES ($1, $2, $3) RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(account.username.as_str())
            .bind(account.email.as_ref().map(Email::as_str))
            .bind(account.credential_kind.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(conflict_or_db)?;

        if let Some(hash) = &account.password_hash {
            sqlx::query("INSERT INTO credentials (account_id, password_hash) VALUES ($1, $2)")
                .bind(row.id)
                .bind(hash.as_phc_string())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        row.into_account()
    }

    async fn find_account(&self, id: AccountId) -> AuthResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_account_by_username(&self, username: &UserName) -> AuthResult<Option<Account>> {
        self.fetch_account("username", username.as_str()).await
    }

    async fn find_account_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        self.fetch_account("email", email.as_str()).await
    }

    async fn find_account_by_phone(&self, phone: &PhoneNumber) -> AuthResult<Option<Account>> {
        self.fetch_account("phone_number", phone.as_str()).await
    }

    async fn password_hash(&self, id: AccountId) -> AuthResult<Option<HashedPassword>> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM credentials WHERE account_id = $1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        hash.map(|h| {
            HashedPassword::from_phc_string(h)
                .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))
        })
        .transpose()
    }

    async fn provision_directory_account(&self, username: &UserName) -> AuthResult<Account> {
        sqlx::query(
            r#"
            INSERT INTO accounts (username, credential_kind)
            VALUES ($1, 'ldap')
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(username.as_str())
        .execute(&self.pool)
        .await?;

        let account = self
            .find_account_by_username(username)
            .await?
            .ok_or_else(|| AuthError::Internal("Provisioned account vanished".to_string()))?;

        if account.credential_kind != CredentialKind::Ldap {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(account)
    }

    async fn set_pending_email(&self, id: AccountId, email: &Email) -> AuthResult<()> {
        sqlx::query("UPDATE accounts SET pending_email = $2, updated_at = now() WHERE id = $1")
            .bind(id.get())
            .bind(email.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_pending_phone(&self, id: AccountId, phone: &PhoneNumber) -> AuthResult<()> {
        sqlx::query("UPDATE accounts SET pending_phone = $2, updated_at = now() WHERE id = $1")
            .bind(id.get())
            .bind(phone.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_accounts(&self, limit: i64, offset: i64) -> AuthResult<Vec<Account>> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AccountRow::into_account).collect()
    }
}

// ============================================================================
// OTP Repository Implementation
// ============================================================================

impl OtpRepository for PgAuthRepository {
    async fn store_code(&self, code: &OneTimeCode) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO one_time_codes (
                account_id,
                purpose,
                code_digest,
                created_at,
                expires_at,
                consumed_at
            ) VALUES ($1, $2, $3, $4, $5, NULL)
            ON CONFLICT (account_id, purpose) DO UPDATE SET
                code_digest = EXCLUDED.code_digest,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at,
                consumed_at = NULL
            "#,
        )
        .bind(code.account_id.get())
        .bind(code.purpose.as_str())
        .bind(&code.code_digest[..])
        .bind(code.created_at)
        .bind(code.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume_code(
        &self,
        selector: &CodeSelector,
        effect: &ConsumeEffect,
    ) -> AuthResult<Option<Account>> {
        let mut tx = self.pool.begin().await?;

        // The outer conditions are re-checked after the row lock, so of two
        // concurrent consumers only one sees a row come back.
        let account_id = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE one_time_codes SET consumed_at = now()
            WHERE id = (
                SELECT id FROM one_time_codes
                WHERE purpose = $1
                  AND code_digest = $2
                  AND ($3::BIGINT IS NULL OR account_id = $3)
                  AND consumed_at IS NULL
                  AND expires_at > now()
                ORDER BY created_at DESC
                LIMIT 1
            )
              AND consumed_at IS NULL
              AND expires_at > now()
            RETURNING account_id
            "#,
        )
        .bind(effect.purpose().as_str())
        .bind(&selector.digest()[..])
        .bind(selector.account().map(AccountId::get))
        .fetch_optional(&mut *tx)
        .await?;

        let Some(account_id) = account_id else {
            return Ok(None);
        };

        match effect {
            ConsumeEffect::VerifyEmail => {
                sqlx::query(
                    r#"
                    UPDATE accounts SET
                        email = COALESCE(pending_email, email),
                        pending_email = NULL,
                        email_verified = TRUE,
                        updated_at = now()
                    WHERE id = $1
                    "#,
                )
                .bind(account_id)
                .execute(&mut *tx)
                .await
                .map_err(conflict_or_db)?;
            }
            ConsumeEffect::VerifyMobile => {
                sqlx::query(
                    r#"
                    UPDATE accounts SET
                        phone_number = COALESCE(pending_phone, phone_number),
                        pending_phone = NULL,
                        mobile_verified = TRUE,
                        updated_at = now()
                    WHERE id = $1
                    "#,
                )
                .bind(account_id)
                .execute(&mut *tx)
                .await
                .map_err(conflict_or_db)?;
            }
            ConsumeEffect::ReplacePassword(hash) => {
                let updated = sqlx::query(
                    r#"
                    UPDATE credentials SET password_hash = $2, updated_at = now()
                    WHERE account_id = $1
                    "#,
                )
                .bind(account_id)
                .bind(hash.as_phc_string())
                .execute(&mut *tx)
                .await?
                .rows_affected();

                // Dropping the transaction rolls the consume back too
                if updated == 0 {
                    return Err(AuthError::Internal(
                        "No local credential to replace".to_string(),
                    ));
                }
            }
        }

        let account = Self::account_in(&mut tx, account_id).await?;
        tx.commit().await?;

        Ok(account)
    }

    async fn peek_code(
        &self,
        selector: &CodeSelector,
        purpose: OtpPurpose,
    ) -> AuthResult<Option<Account>> {
        let account_id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT account_id FROM one_time_codes
            WHERE purpose = $1
              AND code_digest = $2
              AND ($3::BIGINT IS NULL OR account_id = $3)
              AND consumed_at IS NULL
              AND expires_at > now()
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(purpose.as_str())
        .bind(&selector.digest()[..])
        .bind(selector.account().map(AccountId::get))
        .fetch_optional(&self.pool)
        .await?;

        match account_id {
            Some(id) => self.find_account(AccountId::new(id)).await,
            None => Ok(None),
        }
    }

    async fn purge_stale_codes(&self, older_than: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM one_time_codes WHERE expires_at < $1")
            .bind(older_than)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn create_session(&self, session: &Session) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                session_id,
                account_id,
                username,
                credential_kind,
                expires_at,
                created_at,
                last_activity_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(session.session_id)
        .bind(session.account_id.get())
        .bind(session.username.as_str())
        .bind(session.credential_kind.as_str())
        .bind(session.expires_at)
        .bind(session.created_at)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session(&self, session_id: Uuid) -> AuthResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                session_id,
                account_id,
                username,
                credential_kind,
                expires_at,
                created_at,
                last_activity_at
            FROM sessions
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SessionRow::into_session).transpose()
    }

    async fn touch_session(&self, session_id: Uuid) -> AuthResult<()> {
        sqlx::query("UPDATE sessions SET last_activity_at = now() WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> AuthResult<()> {
        sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_sessions_for(&self, account_id: AccountId) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE account_id = $1")
            .bind(account_id.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn purge_expired_sessions(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Preference Repository Implementation
// ============================================================================

impl PreferenceRepository for PgAuthRepository {
    async fn preferences(&self, account_id: AccountId) -> AuthResult<NotificationPreference> {
        let row = sqlx::query_as::<_, PreferenceRow>(
            r#"
            SELECT notify_on_blog, notify_on_comment
            FROM notification_preferences
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(|r| NotificationPreference {
                notify_on_blog: r.notify_on_blog,
                notify_on_comment: r.notify_on_comment,
            })
            .unwrap_or_default())
    }

    async fn update_preferences(
        &self,
        account_id: AccountId,
        preferences: NotificationPreference,
    ) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notification_preferences (account_id, notify_on_blog, notify_on_comment)
            VALUES ($1, $2, $3)
            ON CONFLICT (account_id) DO UPDATE SET
                notify_on_blog = EXCLUDED.notify_on_blog,
                notify_on_comment = EXCLUDED.notify_on_comment,
                updated_at = now()
            "#,
        )
        .bind(account_id.get())
        .bind(preferences.notify_on_blog)
        .bind(preferences.notify_on_comment)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn blog_subscribers(&self, except: AccountId) -> AuthResult<Vec<Recipient>> {
        let rows = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT a.id, a.username, a.email
            FROM accounts a
            LEFT JOIN notification_preferences p ON p.account_id = a.id
            WHERE a.email IS NOT NULL
              AND a.id <> $1
              AND COALESCE(p.notify_on_blog, TRUE)
            ORDER BY a.id
            "#,
        )
        .bind(except.get())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RecipientRow::into_recipient).collect())
    }

    async fn comment_subscriber(&self, account_id: AccountId) -> AuthResult<Option<Recipient>> {
        let row = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT a.id, a.username, a.email
            FROM accounts a
            LEFT JOIN notification_preferences p ON p.account_id = a.id
            WHERE a.id = $1
              AND a.email IS NOT NULL
              AND COALESCE(p.notify_on_comment, TRUE)
            "#,
        )
        .bind(account_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RecipientRow::into_recipient))
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i64,
    username: String,
    email: Option<String>,
    phone_number: Option<String>,
    credential_kind: String,
    email_verified: bool,
    mobile_verified: bool,
    pending_email: Option<String>,
    pending_phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let credential_kind = CredentialKind::from_db(&self.credential_kind).ok_or_else(|| {
            AuthError::Internal(format!("Invalid credential_kind: {}", self.credential_kind))
        })?;

        Ok(Account {
            id: AccountId::new(self.id),
            username: UserName::from_db(self.username),
            email: self.email.map(Email::from_db),
            phone: self.phone_number.map(PhoneNumber::from_db),
            credential_kind,
            email_verified: self.email_verified,
            mobile_verified: self.mobile_verified,
            pending_email: self.pending_email.map(Email::from_db),
            pending_phone: self.pending_phone.map(PhoneNumber::from_db),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: Uuid,
    account_id: i64,
    username: String,
    credential_kind: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> AuthResult<Session> {
        let credential_kind = CredentialKind::from_db(&self.credential_kind).ok_or_else(|| {
            AuthError::Internal(format!("Invalid credential_kind: {}", self.credential_kind))
        })?;

        Ok(Session {
            session_id: self.session_id,
            account_id: AccountId::new(self.account_id),
            username: UserName::from_db(self.username),
            credential_kind,
            expires_at: self.expires_at,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PreferenceRow {
    notify_on_blog: bool,
    notify_on_comment: bool,
}

#[derive(sqlx::FromRow)]
struct RecipientRow {
    id: i64,
    username: String,
    email: String,
}

impl RecipientRow {
    fn into_recipient(self) -> Recipient {
        Recipient {
            account_id: AccountId::new(self.id),
            username: UserName::from_db(self.username),
            email: Email::from_db(self.email),
        }
    }
}
