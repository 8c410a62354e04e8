//! Comment and reply use cases

use std::sync::Arc;

use auth::{AccessGate, AuthStore, Guard, Identity, ResourceKind, VERIFIED};
use kernel::id::{BlogId, CommentId};

use crate::application::config::BlogConfig;
use crate::application::notifier::Notifier;
use crate::application::outbound::BlogOutbound;
use crate::domain::entity::comment::{Comment, NewComment};
use crate::domain::repository::{BlogRepository, BlogStore, CommentRepository};
use crate::domain::value_object::{list_query::ListQuery, post_text::RichText};
use crate::error::{BlogError, BlogResult};

fn comment_body(content: Option<String>) -> BlogResult<RichText> {
    let content =
        content.ok_or_else(|| BlogError::Validation("Content is required".to_string()))?;

    RichText::sanitize(&content).ok_or_else(|| {
        BlogError::Validation("Content is required after sanitization".to_string())
    })
}

pub struct CommentUseCase<A, B>
where
    A: AuthStore,
    B: BlogStore,
{
    accounts: Arc<A>,
    store: Arc<B>,
    notifier: Notifier<A>,
}

impl<A, B> CommentUseCase<A, B>
where
    A: AuthStore,
    B: BlogStore,
{
    pub fn new(
        accounts: Arc<A>,
        store: Arc<B>,
        config: Arc<BlogConfig>,
        outbound: &BlogOutbound,
    ) -> Self {
        let notifier = Notifier::new(accounts.clone(), outbound.mailer.clone(), config);
        Self {
            accounts,
            store,
            notifier,
        }
    }

    fn gate(&self) -> AccessGate<A, B> {
        AccessGate::new(self.accounts.clone(), self.store.clone())
    }

    fn owner_guards(id: CommentId) -> [Guard; 3] {
        [
            Guard::Authenticated,
            Guard::Verified,
            Guard::owns(ResourceKind::Comment, id.get()),
        ]
    }

    async fn existing(&self, id: CommentId) -> BlogResult<Comment> {
        self.store
            .find_comment(id)
            .await?
            .ok_or_else(|| BlogError::NotFound("Comment not found".to_string()))
    }

    pub async fn list_for_blog(&self, blog_id: BlogId, query: &ListQuery) -> BlogResult<Vec<Comment>> {
        self.store.list_comments(blog_id, query).await
    }

    pub async fn get(&self, id: CommentId) -> BlogResult<Comment> {
        self.existing(id).await
    }

    pub async fn replies(&self, id: CommentId) -> BlogResult<Vec<Comment>> {
        self.existing(id).await?;
        self.store.list_replies(id).await
    }

    pub async fn create(
        &self,
        identity: Option<&Identity>,
        blog_id: BlogId,
        content: Option<String>,
    ) -> BlogResult<Comment> {
        let admitted = self.gate().check(identity, VERIFIED).await?;

        let blog = self
            .store
            .find_blog(blog_id)
            .await?
            .ok_or_else(|| BlogError::NotFound("Blog not found".to_string()))?;
        let content = comment_body(content)?;

        let comment = self
            .store
            .create_comment(&NewComment {
                content,
                author_id: admitted.identity.account_id,
                author: admitted.identity.username.to_string(),
                blog_id,
                parent_id: None,
            })
            .await?;

        tracing::info!(comment_id = %comment.id, blog_id = %blog_id, "Comment created");
        self.notifier.comment_posted(&blog, &comment);

        Ok(comment)
    }

    pub async fn reply(
        &self,
        identity: Option<&Identity>,
        parent_id: CommentId,
        content: Option<String>,
    ) -> BlogResult<Comment> {
        let admitted = self.gate().check(identity, VERIFIED).await?;

        let parent = self.existing(parent_id).await?;
        let content = comment_body(content)?;

        let reply = self
            .store
            .create_comment(&NewComment {
                content,
                author_id: admitted.identity.account_id,
                author: admitted.identity.username.to_string(),
                blog_id: parent.blog_id,
                parent_id: Some(parent_id),
            })
            .await?;

        tracing::info!(comment_id = %reply.id, parent_id = %parent_id, "Reply created");

        let blog_title = match self.store.find_blog(parent.blog_id).await {
            Ok(Some(blog)) => blog.title,
            _ => "Unknown Blog".to_string(),
        };
        self.notifier.reply_posted(&parent, &reply, blog_title);

        Ok(reply)
    }

    pub async fn update(
        &self,
        identity: Option<&Identity>,
        id: CommentId,
        content: Option<String>,
    ) -> BlogResult<Comment> {
        self.gate().check(identity, &Self::owner_guards(id)).await?;
        let content = comment_body(content)?;

        let comment = self
            .store
            .update_comment(id, &content)
            .await?
            .ok_or_else(|| BlogError::NotFound("Comment not found or not updated".to_string()))?;

        tracing::info!(comment_id = %id, "Comment updated");
        Ok(comment)
    }

    pub async fn delete(&self, identity: Option<&Identity>, id: CommentId) -> BlogResult<()> {
        self.gate().check(identity, &Self::owner_guards(id)).await?;

        if !self.store.delete_comment(id).await? {
            return Err(BlogError::NotFound(
                "Comment not found or not deleted".to_string(),
            ));
        }

        tracing::info!(comment_id = %id, "Comment deleted");
        Ok(())
    }
}
