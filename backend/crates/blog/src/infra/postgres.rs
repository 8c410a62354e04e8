//! PostgreSQL Repository Implementations

use auth::{AuthResult, OwnershipRepository, ResourceKind};
use chrono::{DateTime, Utc};
use kernel::id::{AccountId, BlogId, CommentId};
use sqlx::PgPool;

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

/// Projection shared by every blog read; `b` is the blog row
const BLOG_PROJECTION: &str = "b.id, b.title, b.content, b.author_id, a.username AS author, \
     b.created_at, b.updated_at";

const COMMENT_PROJECTION: &str = "c.id, c.content, c.author_id, a.username AS author, \
     c.blog_id, c.parent_id, c.created_at, c.updated_at";

/// PostgreSQL-backed blog and comment repository
#[derive(Clone)]
pub struct PgBlogRepository {
    pool: PgPool,
}

impl PgBlogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl BlogRepository for PgBlogRepository {
    async fn create_blog(&self, blog: &NewBlog) -> BlogResult<Blog> {
        let sql = format!(
            "WITH b AS ( \
                 INSERT INTO blogs (title, content, author_id) VALUES ($1, $2, $3) \
                 RETURNING * \
             ) \
             SELECT {BLOG_PROJECTION} FROM b JOIN accounts a ON a.id = b.author_id"
        );

        let row = sqlx::query_as::<_, BlogRow>(&sql)
            .bind(blog.title.as_str())
            .bind(blog.content.as_str())
            .bind(blog.author_id.get())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into_blog())
    }

    async fn find_blog(&self, id: BlogId) -> BlogResult<Option<Blog>> {
        let sql = format!(
            "SELECT {BLOG_PROJECTION} FROM blogs b JOIN accounts a ON a.id = b.author_id \
             WHERE b.id = $1"
        );

        let row = sqlx::query_as::<_, BlogRow>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(BlogRow::into_blog))
    }

    async fn list_blogs(&self, query: &ListQuery) -> BlogResult<Vec<Blog>> {
        let sql = format!(
            "SELECT {BLOG_PROJECTION} FROM blogs b JOIN accounts a ON a.id = b.author_id \
             WHERE ($1::date IS NULL OR b.created_at >= $1::date) \
               AND ($2::text IS NULL OR a.username = $2) \
             ORDER BY b.created_at DESC, b.id DESC \
             LIMIT $3 OFFSET $4"
        );

        let rows = sqlx::query_as::<_, BlogRow>(&sql)
            .bind(query.newer_than)
            .bind(query.author.as_deref())
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(BlogRow::into_blog).collect())
    }

    async fn list_blogs_by(
        &self,
        author_id: AccountId,
        query: &ListQuery,
    ) -> BlogResult<Vec<Blog>> {
        let sql = format!(
            "SELECT {BLOG_PROJECTION} FROM blogs b JOIN accounts a ON a.id = b.author_id \
             WHERE b.author_id = $1 \
               AND ($2::date IS NULL OR b.created_at >= $2::date) \
             ORDER BY b.created_at DESC, b.id DESC \
             LIMIT $3 OFFSET $4"
        );

        let rows = sqlx::query_as::<_, BlogRow>(&sql)
            .bind(author_id.get())
            .bind(query.newer_than)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(BlogRow::into_blog).collect())
    }

    async fn update_blog(
        &self,
        id: BlogId,
        title: &Title,
        content: &RichText,
    ) -> BlogResult<Option<Blog>> {
        let sql = format!(
            "WITH b AS ( \
                 UPDATE blogs SET title = $2, content = $3, updated_at = NOW() \
                 WHERE id = $1 RETURNING * \
             ) \
             SELECT {BLOG_PROJECTION} FROM b JOIN accounts a ON a.id = b.author_id"
        );

        let row = sqlx::query_as::<_, BlogRow>(&sql)
            .bind(id.get())
            .bind(title.as_str())
            .bind(content.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(BlogRow::into_blog))
    }

    async fn delete_blog(&self, id: BlogId) -> BlogResult<bool> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl CommentRepository for PgBlogRepository {
    async fn create_comment(&self, comment: &NewComment) -> BlogResult<Comment> {
        let sql = format!(
            "WITH c AS ( \
                 INSERT INTO comments (content, author_id, blog_id, parent_id) \
                 VALUES ($1, $2, $3, $4) RETURNING * \
             ) \
             SELECT {COMMENT_PROJECTION} FROM c JOIN accounts a ON a.id = c.author_id"
        );

        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(comment.content.as_str())
            .bind(comment.author_id.get())
            .bind(comment.blog_id.get())
            .bind(comment.parent_id.map(CommentId::get))
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into_comment())
    }

    async fn find_comment(&self, id: CommentId) -> BlogResult<Option<Comment>> {
        let sql = format!(
            "SELECT {COMMENT_PROJECTION} FROM comments c JOIN accounts a ON a.id = c.author_id \
             WHERE c.id = $1"
        );

        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CommentRow::into_comment))
    }

    async fn list_comments(&self, blog_id: BlogId, query: &ListQuery) -> BlogResult<Vec<Comment>> {
        let sql = format!(
            "SELECT {COMMENT_PROJECTION} FROM comments c JOIN accounts a ON a.id = c.author_id \
             WHERE c.blog_id = $1 \
               AND ($2::date IS NULL OR c.created_at >= $2::date) \
             ORDER BY c.created_at ASC, c.id ASC \
             LIMIT $3 OFFSET $4"
        );

        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(blog_id.get())
            .bind(query.newer_than)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(CommentRow::into_comment).collect())
    }

    async fn list_replies(&self, parent_id: CommentId) -> BlogResult<Vec<Comment>> {
        let sql = format!(
            "SELECT {COMMENT_PROJECTION} FROM comments c JOIN accounts a ON a.id = c.author_id \
             WHERE c.parent_id = $1 \
             ORDER BY c.created_at ASC, c.id ASC"
        );

        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(parent_id.get())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(CommentRow::into_comment).collect())
    }

    async fn update_comment(
        &self,
        id: CommentId,
        content: &RichText,
    ) -> BlogResult<Option<Comment>> {
        let sql = format!(
            "WITH c AS ( \
                 UPDATE comments SET content = $2, updated_at = NOW() \
                 WHERE id = $1 RETURNING * \
             ) \
             SELECT {COMMENT_PROJECTION} FROM c JOIN accounts a ON a.id = c.author_id"
        );

        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id.get())
            .bind(content.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CommentRow::into_comment))
    }

    async fn delete_comment(&self, id: CommentId) -> BlogResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl OwnershipRepository for PgBlogRepository {
    async fn owner_of(&self, kind: ResourceKind, id: i64) -> AuthResult<Option<AccountId>> {
        let sql = match kind {
            ResourceKind::Blog => "SELECT author_id FROM blogs WHERE id = $1",
            ResourceKind::Comment => "SELECT author_id FROM comments WHERE id = $1",
        };

        let owner: Option<i64> = sqlx::query_scalar(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner.map(AccountId::new))
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct BlogRow {
    id: i64,
    title: String,
    content: String,
    author_id: i64,
    author: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BlogRow {
    fn into_blog(self) -> Blog {
        Blog {
            id: BlogId::new(self.id),
            title: self.title,
            content: self.content,
            author_id: AccountId::new(self.author_id),
            author: self.author,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    content: String,
    author_id: i64,
    author: String,
    blog_id: i64,
    parent_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            id: CommentId::new(self.id),
            content: self.content,
            author_id: AccountId::new(self.author_id),
            author: self.author,
            blog_id: BlogId::new(self.blog_id),
            parent_id: self.parent_id.map(CommentId::new),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
