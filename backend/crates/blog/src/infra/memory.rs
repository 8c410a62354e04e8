//! In-memory repository
//!
//! Backs the HTTP tests. Deletes cascade the way the foreign keys do.

use std::sync::Arc;

use auth::{AuthResult, OwnershipRepository, ResourceKind};
use chrono::Utc;
use kernel::id::{AccountId, BlogId, CommentId};
use tokio::sync::Mutex;

use crate::domain::entity::{
    blog::{Blog, NewBlog},
    comment::{Comment, NewComment},
};
use crate::domain::repository::{BlogRepository, CommentRepository};
use crate::domain::value_object::{
    list_query::ListQuery,
    post_text::{RichText, Title},
};
use crate::error::BlogResult;

#[derive(Default)]
struct State {
    next_blog: i64,
    next_comment: i64,
    blogs: Vec<Blog>,
    comments: Vec<Comment>,
}

impl State {
    /// `root` and every comment below it
    fn subtree(&self, root: CommentId) -> Vec<CommentId> {
        let mut ids = vec![root];
        let mut i = 0;
        while i < ids.len() {
            let parent = ids[i];
            ids.extend(
                self.comments
                    .iter()
                    .filter(|c| c.parent_id == Some(parent))
                    .map(|c| c.id),
            );
            i += 1;
        }
        ids
    }
}

fn page<T>(rows: impl Iterator<Item = T>, query: &ListQuery) -> Vec<T> {
    rows.skip(query.offset as usize)
        .take(query.limit as usize)
        .collect()
}

#[derive(Clone, Default)]
pub struct InMemoryBlogStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlogRepository for InMemoryBlogStore {
    async fn create_blog(&self, blog: &NewBlog) -> BlogResult<Blog> {
        let mut state = self.state.lock().await;
        state.next_blog += 1;

        let now = Utc::now();
        let row = Blog {
            id: BlogId::new(state.next_blog),
            title: blog.title.as_str().to_string(),
            content: blog.content.as_str().to_string(),
            author_id: blog.author_id,
            author: blog.author.clone(),
            created_at: now,
            updated_at: now,
        };
        state.blogs.push(row.clone());

        Ok(row)
    }

    async fn find_blog(&self, id: BlogId) -> BlogResult<Option<Blog>> {
        let state = self.state.lock().await;
        Ok(state.blogs.iter().find(|b| b.id == id).cloned())
    }

    async fn list_blogs(&self, query: &ListQuery) -> BlogResult<Vec<Blog>> {
        let state = self.state.lock().await;
        let rows = state
            .blogs
            .iter()
            .rev()
            .filter(|b| query.admits(b.created_at))
            .filter(|b| query.author.as_deref().is_none_or(|a| a == b.author))
            .cloned();
        Ok(page(rows, query))
    }

    async fn list_blogs_by(
        &self,
        author_id: AccountId,
        query: &ListQuery,
    ) -> BlogResult<Vec<Blog>> {
        let state = self.state.lock().await;
        let rows = state
            .blogs
            .iter()
            .rev()
            .filter(|b| b.author_id == author_id && query.admits(b.created_at))
            .cloned();
        Ok(page(rows, query))
    }

    async fn update_blog(
        &self,
        id: BlogId,
        title: &Title,
        content: &RichText,
    ) -> BlogResult<Option<Blog>> {
        let mut state = self.state.lock().await;
        Ok(state.blogs.iter_mut().find(|b| b.id == id).map(|blog| {
            blog.title = title.as_str().to_string();
            blog.content = content.as_str().to_string();
            blog.updated_at = Utc::now();
            blog.clone()
        }))
    }

    async fn delete_blog(&self, id: BlogId) -> BlogResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.blogs.len();
        state.blogs.retain(|b| b.id != id);
        if state.blogs.len() == before {
            return Ok(false);
        }
        state.comments.retain(|c| c.blog_id != id);
        Ok(true)
    }
}

impl CommentRepository for InMemoryBlogStore {
    async fn create_comment(&self, comment: &NewComment) -> BlogResult<Comment> {
        let mut state = self.state.lock().await;
        state.next_comment += 1;

        let now = Utc::now();
        let row = Comment {
            id: CommentId::new(state.next_comment),
            content: comment.content.as_str().to_string(),
            author_id: comment.author_id,
            author: comment.author.clone(),
            blog_id: comment.blog_id,
            parent_id: comment.parent_id,
            created_at: now,
            updated_at: now,
        };
        state.comments.push(row.clone());

        Ok(row)
    }

    async fn find_comment(&self, id: CommentId) -> BlogResult<Option<Comment>> {
        let state = self.state.lock().await;
        Ok(state.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments(&self, blog_id: BlogId, query: &ListQuery) -> BlogResult<Vec<Comment>> {
        let state = self.state.lock().await;
        let rows = state
            .comments
            .iter()
            .filter(|c| c.blog_id == blog_id && query.admits(c.created_at))
            .cloned();
        Ok(page(rows, query))
    }

    async fn list_replies(&self, parent_id: CommentId) -> BlogResult<Vec<Comment>> {
        let state = self.state.lock().await;
        Ok(state
            .comments
            .iter()
            .filter(|c| c.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn update_comment(
        &self,
        id: CommentId,
        content: &RichText,
    ) -> BlogResult<Option<Comment>> {
        let mut state = self.state.lock().await;
        Ok(state.comments.iter_mut().find(|c| c.id == id).map(|comment| {
            comment.content = content.as_str().to_string();
            comment.updated_at = Utc::now();
            comment.clone()
        }))
    }

    async fn delete_comment(&self, id: CommentId) -> BlogResult<bool> {
        let mut state = self.state.lock().await;
        if !state.comments.iter().any(|c| c.id == id) {
            return Ok(false);
        }
        let doomed = state.subtree(id);
        state.comments.retain(|c| !doomed.contains(&c.id));
        Ok(true)
    }
}

impl OwnershipRepository for InMemoryBlogStore {
    async fn owner_of(&self, kind: ResourceKind, id: i64) -> AuthResult<Option<AccountId>> {
        let state = self.state.lock().await;
        Ok(match kind {
            ResourceKind::Blog => state
                .blogs
                .iter()
                .find(|b| b.id == BlogId::new(id))
                .map(|b| b.author_id),
            ResourceKind::Comment => state
                .comments
                .iter()
                .find(|c| c.id == CommentId::new(id))
                .map(|c| c.author_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_blog(author: i64, title: &str) -> NewBlog {
        NewBlog {
            title: Title::sanitize(title).unwrap(),
            content: RichText::sanitize("<p>body</p>").unwrap(),
            author_id: AccountId::new(author),
            author: format!("user{author}"),
        }
    }

    fn new_comment(blog: BlogId, parent: Option<CommentId>) -> NewComment {
        NewComment {
            content: RichText::sanitize("hi").unwrap(),
            author_id: AccountId::new(1),
            author: "user1".into(),
            blog_id: blog,
            parent_id: parent,
        }
    }

    #[tokio::test]
    async fn test_blog_listing_is_newest_first_and_filtered() {
        let store = InMemoryBlogStore::new();
        store.create_blog(&new_blog(1, "first")).await.unwrap();
        store.create_blog(&new_blog(2, "second")).await.unwrap();
        store.create_blog(&new_blog(1, "third")).await.unwrap();

        let all = store.list_blogs(&ListQuery::default()).await.unwrap();
        let titles: Vec<_> = all.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["third", "second", "first"]);

        let query = ListQuery::new(None, Some("user2"), None, None).unwrap();
        let by_author = store.list_blogs(&query).await.unwrap();
        assert_eq!(by_author.len(), 1);

        let mine = store
            .list_blogs_by(AccountId::new(1), &ListQuery::new(None, None, Some(1), Some(1)).unwrap())
            .await
            .unwrap();
        assert_eq!(mine[0].title, "first");
    }

    #[tokio::test]
    async fn test_deletes_cascade() {
        let store = InMemoryBlogStore::new();
        let blog = store.create_blog(&new_blog(1, "post")).await.unwrap();
        let top = store.create_comment(&new_comment(blog.id, None)).await.unwrap();
        let reply = store
            .create_comment(&new_comment(blog.id, Some(top.id)))
            .await
            .unwrap();
        store
            .create_comment(&new_comment(blog.id, Some(reply.id)))
            .await
            .unwrap();

        assert!(store.delete_comment(top.id).await.unwrap());
        assert!(
            store
                .list_comments(blog.id, &ListQuery::default())
                .await
                .unwrap()
                .is_empty()
        );

        store.create_comment(&new_comment(blog.id, None)).await.unwrap();
        assert!(store.delete_blog(blog.id).await.unwrap());
        assert!(!store.delete_blog(blog.id).await.unwrap());
        assert!(
            store
                .list_comments(blog.id, &ListQuery::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_owner_lookup() {
        let store = InMemoryBlogStore::new();
        let blog = store.create_blog(&new_blog(4, "post")).await.unwrap();

        let owner = store.owner_of(ResourceKind::Blog, blog.id.get()).await.unwrap();
        assert_eq!(owner, Some(AccountId::new(4)));
        assert!(store.owner_of(ResourceKind::Comment, 1).await.unwrap().is_none());
    }
}
