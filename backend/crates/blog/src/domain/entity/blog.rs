//! Blog Entity

use chrono::{DateTime, Utc};
use kernel::id::{AccountId, BlogId};

use crate::domain::value_object::post_text::{RichText, Title};

/// A published post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blog {
    pub id: BlogId,
    pub title: String,
    pub content: String,
    pub author_id: AccountId,
    /// Author's username at read time
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Blog {
    /// Leading characters of the body with markup removed, for
    /// notification mail
    pub fn excerpt(&self, chars: usize) -> String {
        platform::sanitize::sanitize_text(&self.content)
            .chars()
            .take(chars)
            .collect()
    }
}

/// Insert payload
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: Title,
    pub content: RichText,
    pub author_id: AccountId,
    /// Kept by stores that cannot join the accounts table
    pub author: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_counts_characters() {
        let now = Utc::now();
        let blog = Blog {
            id: BlogId::new(1),
            title: "t".into(),
            content: "héllo wörld".into(),
            author_id: AccountId::new(1),
            author: "alice".into(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(blog.excerpt(5), "héllo");
        assert_eq!(blog.excerpt(200), "héllo wörld");

        let rich = Blog {
            content: "<p>one <strong>two</strong></p>".into(),
            ..blog
        };
        assert_eq!(rich.excerpt(200), "one two");
    }
}
