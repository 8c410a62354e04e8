//! Repository Traits

use auth::OwnershipRepository;
use kernel::id::{AccountId, BlogId, CommentId};

use crate::domain::entity::{
    blog::{Blog, NewBlog},
    comment::{Comment, NewComment},
};
use crate::domain::value_object::{
    list_query::ListQuery,
    post_text::{RichText, Title},
};
use crate::error::BlogResult;

/// Blog persistence
#[trait_variant::make(BlogRepository: Send)]
pub trait LocalBlogRepository {
    async fn create_blog(&self, blog: &NewBlog) -> BlogResult<Blog>;

    async fn find_blog(&self, id: BlogId) -> BlogResult<Option<Blog>>;

    /// Newest first; honours every filter in `query`
    async fn list_blogs(&self, query: &ListQuery) -> BlogResult<Vec<Blog>>;

    /// Newest first; `query.author` is ignored
    async fn list_blogs_by(&self, author_id: AccountId, query: &ListQuery)
    -> BlogResult<Vec<Blog>>;

    /// `None` when the blog is gone
    async fn update_blog(
        &self,
        id: BlogId,
        title: &Title,
        content: &RichText,
    ) -> BlogResult<Option<Blog>>;

    /// Removes the blog and its comments; `false` when nothing was deleted
    async fn delete_blog(&self, id: BlogId) -> BlogResult<bool>;
}

/// Comment persistence
#[trait_variant::make(CommentRepository: Send)]
pub trait LocalCommentRepository {
    async fn create_comment(&self, comment: &NewComment) -> BlogResult<Comment>;

    async fn find_comment(&self, id: CommentId) -> BlogResult<Option<Comment>>;

    /// Every comment on a blog, replies included, oldest first
    async fn list_comments(&self, blog_id: BlogId, query: &ListQuery) -> BlogResult<Vec<Comment>>;

    /// Direct replies, oldest first
    async fn list_replies(&self, parent_id: CommentId) -> BlogResult<Vec<Comment>>;

    async fn update_comment(&self, id: CommentId, content: &RichText)
    -> BlogResult<Option<Comment>>;

    /// Removes the comment and its replies
    async fn delete_comment(&self, id: CommentId) -> BlogResult<bool>;
}

/// Everything the blog routes need from one store, including the owner
/// lookup the access gate runs against
pub trait BlogStore:
    BlogRepository + CommentRepository + OwnershipRepository + Clone + Send + Sync + 'static
{
}

impl<T> BlogStore for T where
    T: BlogRepository + CommentRepository + OwnershipRepository + Clone + Send + Sync + 'static
{
}
