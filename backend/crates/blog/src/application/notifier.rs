//! Notification fan-out
//!
//! Recipient lookup and delivery both run on a detached task after the
//! mutation has committed. Nothing here can fail the request.

use std::sync::Arc;

use auth::{PreferenceRepository, Recipient};
use kernel::id::AccountId;
use platform::mail::{Mailer, OutboundEmail};

use crate::application::config::BlogConfig;
use crate::domain::entity::{blog::Blog, comment::Comment};

const FOOTER: &str = "To manage your notification preferences, visit your profile page.\n\n\
                      Best regards,\nThe Blog Service Team";

pub fn new_blog_email(to: &str, blog: &Blog, excerpt_chars: usize) -> OutboundEmail {
    OutboundEmail::new(
        to,
        format!("New Blog Post: {}", blog.title),
        format!(
            "Hi there,\n\n\
             {} just published a new blog post:\n\n\
             {}\n\n\
             {}... (continue reading on the website)\n\n\
             Visit our blog service to read the full post.\n\n{}",
            blog.author,
            blog.title,
            blog.excerpt(excerpt_chars),
            FOOTER
        ),
    )
}

pub fn new_comment_email(to: &str, blog_title: &str, comment: &Comment) -> OutboundEmail {
    let quoted: String = platform::sanitize::sanitize_text(&comment.content)
        .chars()
        .take(200)
        .collect();

    OutboundEmail::new(
        to,
        format!("New Comment on Your Blog: {}", blog_title),
        format!(
            "Hi there,\n\n\
             {} just commented on your blog post \"{}\":\n\n\
             \"{}\"\n\n\
             Visit our blog service to view the comment and respond.\n\n{}",
            comment.author, blog_title, quoted, FOOTER
        ),
    )
}

pub struct Notifier<P>
where
    P: PreferenceRepository + Send + Sync + 'static,
{
    prefs: Arc<P>,
    mailer: Arc<dyn Mailer>,
    config: Arc<BlogConfig>,
}

impl<P> Notifier<P>
where
    P: PreferenceRepository + Send + Sync + 'static,
{
    pub fn new(prefs: Arc<P>, mailer: Arc<dyn Mailer>, config: Arc<BlogConfig>) -> Self {
        Self {
            prefs,
            mailer,
            config,
        }
    }

    /// Every opted-in account except the author
    pub fn blog_published(&self, blog: &Blog) {
        if !self.config.notifications_enabled {
            return;
        }

        let prefs = self.prefs.clone();
        let mailer = self.mailer.clone();
        let blog = blog.clone();
        let excerpt_chars = self.config.excerpt_chars;

        tokio::spawn(async move {
            let recipients = match prefs.blog_subscribers(blog.author_id).await {
                Ok(recipients) => recipients,
                Err(e) => {
                    tracing::warn!(blog_id = %blog.id, error = %e, "Subscriber lookup failed");
                    return;
                }
            };

            let mut delivered = 0usize;
            for recipient in &recipients {
                let email = new_blog_email(recipient.email.as_str(), &blog, excerpt_chars);
                match mailer.send(email).await {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!(
                            blog_id = %blog.id,
                            account_id = %recipient.account_id,
                            error = %e,
                            "Blog notification failed"
                        );
                    }
                }
            }

            tracing::info!(
                blog_id = %blog.id,
                recipients = recipients.len(),
                delivered,
                "Blog notifications sent"
            );
        });
    }

    /// The blog author, unless they wrote the comment
    pub fn comment_posted(&self, blog: &Blog, comment: &Comment) {
        self.notify_one(blog.author_id, blog.title.clone(), comment);
    }

    /// The parent comment's author, unless they wrote the reply
    pub fn reply_posted(&self, parent: &Comment, reply: &Comment, blog_title: String) {
        self.notify_one(parent.author_id, blog_title, reply);
    }

    fn notify_one(&self, owner: AccountId, blog_title: String, comment: &Comment) {
        if !self.config.notifications_enabled || owner == comment.author_id {
            return;
        }

        let prefs = self.prefs.clone();
        let mailer = self.mailer.clone();
        let comment = comment.clone();

        tokio::spawn(async move {
            let recipient: Recipient = match prefs.comment_subscriber(owner).await {
                Ok(Some(recipient)) => recipient,
                Ok(None) => return,
                Err(e) => {
                    tracing::warn!(comment_id = %comment.id, error = %e, "Subscriber lookup failed");
                    return;
                }
            };

            let email = new_comment_email(recipient.email.as_str(), &blog_title, &comment);
            match mailer.send(email).await {
                Ok(()) => tracing::info!(
                    comment_id = %comment.id,
                    account_id = %recipient.account_id,
                    "Comment notification sent"
                ),
                Err(e) => tracing::warn!(
                    comment_id = %comment.id,
                    account_id = %recipient.account_id,
                    error = %e,
                    "Comment notification failed"
                ),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kernel::id::{BlogId, CommentId};

    #[test]
    fn test_blog_email_template() {
        let now = Utc::now();
        let blog = Blog {
            id: BlogId::new(3),
            title: "Rust at Work".into(),
            content: "x".repeat(500),
            author_id: AccountId::new(1),
            author: "alice".into(),
            created_at: now,
            updated_at: now,
        };

        let email = new_blog_email("bob@example.com", &blog, 200);
        assert_eq!(email.subject, "New Blog Post: Rust at Work");
        assert!(email.body.contains("alice just published"));
        assert!(email.body.contains(&format!("{}...", "x".repeat(200))));
        assert!(!email.body.contains(&"x".repeat(201)));
    }

    #[test]
    fn test_comment_email_template() {
        let now = Utc::now();
        let comment = Comment {
            id: CommentId::new(8),
            content: "<p>Nice post</p>".into(),
            author_id: AccountId::new(2),
            author: "bob".into(),
            blog_id: BlogId::new(3),
            parent_id: None,
            created_at: now,
            updated_at: now,
        };

        let email = new_comment_email("alice@example.com", "Rust at Work", &comment);
        assert_eq!(email.subject, "New Comment on Your Blog: Rust at Work");
        assert!(email.body.contains("\"Nice post\""));
    }
}
