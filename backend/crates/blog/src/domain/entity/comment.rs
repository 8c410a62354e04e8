//! Comment Entity

use chrono::{DateTime, Utc};
use kernel::id::{AccountId, BlogId, CommentId};

use crate::domain::value_object::post_text::RichText;

/// A comment on a blog, or a reply to another comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub author_id: AccountId,
    pub author: String,
    pub blog_id: BlogId,
    /// Set for replies
    pub parent_id: Option<CommentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: RichText,
    pub author_id: AccountId,
    pub author: String,
    pub blog_id: BlogId,
    pub parent_id: Option<CommentId>,
}
