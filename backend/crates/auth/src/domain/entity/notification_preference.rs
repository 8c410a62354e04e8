//! Notification Preference Entity

use kernel::id::AccountId;
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{email::Email, user_name::UserName};

/// Per-account opt-ins; both default on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreference {
    pub notify_on_blog: bool,
    pub notify_on_comment: bool,
}

impl Default for NotificationPreference {
    fn default() -> Self {
        Self {
            notify_on_blog: true,
            notify_on_comment: true,
        }
    }
}

/// An account that should receive a notification email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub account_id: AccountId,
    pub username: UserName,
    pub email: Email,
}
