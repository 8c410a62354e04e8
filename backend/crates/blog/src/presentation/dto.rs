//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{BlogInput, GenerateInput};
use crate::domain::entity::{blog::Blog, comment::Comment};
use crate::domain::value_object::list_query::ListQuery;
use crate::error::BlogResult;

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub newer_than: Option<String>,
    pub author: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListParams {
    pub fn into_query(self) -> BlogResult<ListQuery> {
        ListQuery::new(
            self.newer_than.as_deref(),
            self.author.as_deref(),
            self.limit,
            self.offset,
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl From<BlogRequest> for BlogInput {
    fn from(req: BlogRequest) -> Self {
        BlogInput {
            title: req.title,
            content: req.content,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentRequest {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    pub prompt: Option<String>,
    pub mode: Option<String>,
    pub content: Option<String>,
}

impl From<GenerateRequest> for GenerateInput {
    fn from(req: GenerateRequest) -> Self {
        GenerateInput {
            prompt: req.prompt,
            mode: req.mode,
            content: req.content,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogView {
    pub blog_id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Blog> for BlogView {
    fn from(blog: Blog) -> Self {
        Self {
            blog_id: blog.id.get(),
            title: blog.title,
            content: blog.content,
            user_id: blog.author_id.get(),
            author: blog.author,
            created_at: blog.created_at,
            updated_at: blog.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub comment_id: i64,
    pub content: String,
    pub user_id: i64,
    pub author: String,
    pub blog_id: i64,
    pub parent_comment_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            comment_id: comment.id.get(),
            content: comment.content,
            user_id: comment.author_id.get(),
            author: comment.author,
            blog_id: comment.blog_id.get(),
            parent_comment_id: comment.parent_id.map(|id| id.get()),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlogsResponse {
    pub blogs: Vec<BlogView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepliesResponse {
    pub replies: Vec<CommentView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub generated_content: String,
}
