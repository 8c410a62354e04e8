//! Blog use cases

use std::sync::Arc;

use auth::{AccessGate, AccountRepository, AuthStore, Guard, Identity, ResourceKind, VERIFIED};
use kernel::id::{AccountId, BlogId};

use crate::application::config::BlogConfig;
use crate::application::notifier::Notifier;
use crate::application::outbound::BlogOutbound;
use crate::domain::entity::blog::{Blog, NewBlog};
use crate::domain::repository::{BlogRepository, BlogStore};
use crate::domain::value_object::{
    list_query::ListQuery,
    post_text::{RichText, Title},
};
use crate::error::{BlogError, BlogResult};

/// Create or update payload, fields as the client sent them
#[derive(Debug, Clone, Default)]
pub struct BlogInput {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl BlogInput {
    fn validate(self) -> BlogResult<(Title, RichText)> {
        let (Some(title), Some(content)) = (self.title, self.content) else {
            return Err(BlogError::Validation(
                "Title and content are required".to_string(),
            ));
        };

        match (Title::sanitize(&title), RichText::sanitize(&content)) {
            (Some(title), Some(content)) => Ok((title, content)),
            _ => Err(BlogError::Validation(
                "Title and content are required after sanitization".to_string(),
            )),
        }
    }
}

pub struct BlogUseCase<A, B>
where
    A: AuthStore,
    B: BlogStore,
{
    accounts: Arc<A>,
    blogs: Arc<B>,
    notifier: Notifier<A>,
}

impl<A, B> BlogUseCase<A, B>
where
    A: AuthStore,
    B: BlogStore,
{
    pub fn new(
        accounts: Arc<A>,
        blogs: Arc<B>,
        config: Arc<BlogConfig>,
        outbound: &BlogOutbound,
    ) -> Self {
        let notifier = Notifier::new(accounts.clone(), outbound.mailer.clone(), config);
        Self {
            accounts,
            blogs,
            notifier,
        }
    }

    fn gate(&self) -> AccessGate<A, B> {
        AccessGate::new(self.accounts.clone(), self.blogs.clone())
    }

    fn owner_guards(id: BlogId) -> [Guard; 3] {
        [
            Guard::Authenticated,
            Guard::Verified,
            Guard::owns(ResourceKind::Blog, id.get()),
        ]
    }

    pub async fn list(&self, query: &ListQuery) -> BlogResult<Vec<Blog>> {
        self.blogs.list_blogs(query).await
    }

    pub async fn get(&self, id: BlogId) -> BlogResult<Blog> {
        self.blogs
            .find_blog(id)
            .await?
            .ok_or_else(|| BlogError::NotFound("Blog not found".to_string()))
    }

    /// Blogs written by one account
    pub async fn list_for_user(&self, user_id: AccountId, query: &ListQuery) -> BlogResult<Vec<Blog>> {
        self.accounts
            .find_account(user_id)
            .await?
            .ok_or_else(|| BlogError::NotFound("User not found".to_string()))?;

        self.blogs.list_blogs_by(user_id, query).await
    }

    pub async fn create(&self, identity: Option<&Identity>, input: BlogInput) -> BlogResult<Blog> {
        let admitted = self.gate().check(identity, VERIFIED).await?;
        let (title, content) = input.validate()?;

        let blog = self
            .blogs
            .create_blog(&NewBlog {
                title,
                content,
                author_id: admitted.identity.account_id,
                author: admitted.identity.username.to_string(),
            })
            .await?;

        tracing::info!(blog_id = %blog.id, author_id = %blog.author_id, "Blog created");
        self.notifier.blog_published(&blog);

        Ok(blog)
    }

    pub async fn update(
        &self,
        identity: Option<&Identity>,
        id: BlogId,
        input: BlogInput,
    ) -> BlogResult<Blog> {
        self.gate().check(identity, &Self::owner_guards(id)).await?;
        let (title, content) = input.validate()?;

        let blog = self
            .blogs
            .update_blog(id, &title, &content)
            .await?
            .ok_or_else(|| BlogError::NotFound("Blog not found or not updated".to_string()))?;

        tracing::info!(blog_id = %id, "Blog updated");
        Ok(blog)
    }

    pub async fn delete(&self, identity: Option<&Identity>, id: BlogId) -> BlogResult<()> {
        self.gate().check(identity, &Self::owner_guards(id)).await?;

        if !self.blogs.delete_blog(id).await? {
            return Err(BlogError::NotFound(
                "Blog not found or not deleted".to_string(),
            ));
        }

        tracing::info!(blog_id = %id, "Blog deleted");
        Ok(())
    }
}
