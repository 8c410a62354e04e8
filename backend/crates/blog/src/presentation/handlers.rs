//! HTTP Handlers

use std::sync::Arc;

use auth::{AuthStore, ResolvedIdentity};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::id::{AccountId, BlogId, CommentId};
use kernel::response::{ApiJson, ApiPath, ApiQuery, Success};

use crate::application::{
    BlogConfig, BlogOutbound, BlogUseCase, CommentUseCase, GenerateUseCase,
};
use crate::domain::repository::BlogStore;
use crate::error::BlogResult;
use crate::presentation::dto::{
    BlogRequest, BlogView, BlogsResponse, CommentRequest, CommentView, CommentsResponse,
    GenerateRequest, GenerateResponse, ListParams, RepliesResponse,
};

/// Shared state for blog handlers
#[derive(Clone)]
pub struct BlogAppState<A, B>
where
    A: AuthStore,
    B: BlogStore,
{
    pub accounts: Arc<A>,
    pub store: Arc<B>,
    pub config: Arc<BlogConfig>,
    pub outbound: BlogOutbound,
}

impl<A, B> BlogAppState<A, B>
where
    A: AuthStore,
    B: BlogStore,
{
    fn blogs(&self) -> BlogUseCase<A, B> {
        BlogUseCase::new(
            self.accounts.clone(),
            self.store.clone(),
            self.config.clone(),
            &self.outbound,
        )
    }

    fn comments(&self) -> CommentUseCase<A, B> {
        CommentUseCase::new(
            self.accounts.clone(),
            self.store.clone(),
            self.config.clone(),
            &self.outbound,
        )
    }
}

// ============================================================================
// Blogs
// ============================================================================

/// GET /blogs-api
pub async fn list_blogs<A, B>(
    State(state): State<BlogAppState<A, B>>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> BlogResult<impl IntoResponse>
where
    A: AuthStore,
    B: BlogStore,
{
    let blogs = state.blogs().list(&params.into_query()?).await?;
    Ok(Success::ok(BlogsResponse {
        blogs: blogs.into_iter().map(BlogView::from).collect(),
    }))
}

/// GET /blogs-api/{blog_id}
pub async fn get_blog<A, B>(
    State(state): State<BlogAppState<A, B>>,
    ApiPath(blog_id): ApiPath<BlogId>,
) -> BlogResult<impl IntoResponse>
where
    A: AuthStore,
    B: BlogStore,
{
    let blog = state.blogs().get(blog_id).await?;
    Ok(Success::ok(BlogView::from(blog)))
}

/// GET /users-api/{user_id}/blogs
pub async fn list_user_blogs<A, B>(
    State(state): State<BlogAppState<A, B>>,
    ApiPath(user_id): ApiPath<AccountId>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> BlogResult<impl IntoResponse>
where
    A: AuthStore,
    B: BlogStore,
{
    let blogs = state
        .blogs()
        .list_for_user(user_id, &params.into_query()?)
        .await?;
    Ok(Success::ok(BlogsResponse {
        blogs: blogs.into_iter().map(BlogView::from).collect(),
    }))
}

/// POST /blogs/create
pub async fn create_blog<A, B>(
    State(state): State<BlogAppState<A, B>>,
    identity: ResolvedIdentity,
    ApiJson(req): ApiJson<BlogRequest>,
) -> BlogResult<impl IntoResponse>
where
    A: AuthStore,
    B: BlogStore,
{
    let blog = state.blogs().create(identity.identity(), req.into()).await?;
    Ok(Success::created(BlogView::from(blog)))
}

/// PUT /blogs/{blog_id}/update
pub async fn update_blog<A, B>(
    State(state): State<BlogAppState<A, B>>,
    identity: ResolvedIdentity,
    ApiPath(blog_id): ApiPath<BlogId>,
    ApiJson(req): ApiJson<BlogRequest>,
) -> BlogResult<impl IntoResponse>
where
    A: AuthStore,
    B: BlogStore,
{
    let blog = state
        .blogs()
        .update(identity.identity(), blog_id, req.into())
        .await?;
    Ok(Success::ok(BlogView::from(blog)))
}

/// DELETE /blogs/{blog_id}/delete
pub async fn delete_blog<A, B>(
    State(state): State<BlogAppState<A, B>>,
    identity: ResolvedIdentity,
    ApiPath(blog_id): ApiPath<BlogId>,
) -> BlogResult<StatusCode>
where
    A: AuthStore,
    B: BlogStore,
{
    state.blogs().delete(identity.identity(), blog_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Comments
// ============================================================================

/// GET /blogs-api/{blog_id}/comments
pub async fn list_comments<A, B>(
    State(state): State<BlogAppState<A, B>>,
    ApiPath(blog_id): ApiPath<BlogId>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> BlogResult<impl IntoResponse>
where
    A: AuthStore,
    B: BlogStore,
{
    let comments = state
        .comments()
        .list_for_blog(blog_id, &params.into_query()?)
        .await?;
    Ok(Success::ok(CommentsResponse {
        comments: comments.into_iter().map(CommentView::from).collect(),
    }))
}

/// POST /blogs/{blog_id}/comments/create
pub async fn create_comment<A, B>(
    State(state): State<BlogAppState<A, B>>,
    identity: ResolvedIdentity,
    ApiPath(blog_id): ApiPath<BlogId>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> BlogResult<impl IntoResponse>
where
    A: AuthStore,
    B: BlogStore,
{
    let comment = state
        .comments()
        .create(identity.identity(), blog_id, req.content)
        .await?;
    Ok(Success::created(CommentView::from(comment)))
}

/// GET /comments/{comment_id}
pub async fn get_comment<A, B>(
    State(state): State<BlogAppState<A, B>>,
    ApiPath(comment_id): ApiPath<CommentId>,
) -> BlogResult<impl IntoResponse>
where
    A: AuthStore,
    B: BlogStore,
{
    let comment = state.comments().get(comment_id).await?;
    Ok(Success::ok(CommentView::from(comment)))
}

/// PUT /comments/{comment_id}/update
pub async fn update_comment<A, B>(
    State(state): State<BlogAppState<A, B>>,
    identity: ResolvedIdentity,
    ApiPath(comment_id): ApiPath<CommentId>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> BlogResult<impl IntoResponse>
where
    A: AuthStore,
    B: BlogStore,
{
    let comment = state
        .comments()
        .update(identity.identity(), comment_id, req.content)
        .await?;
    Ok(Success::ok(CommentView::from(comment)))
}

/// DELETE /comments/{comment_id}/delete
pub async fn delete_comment<A, B>(
    State(state): State<BlogAppState<A, B>>,
    identity: ResolvedIdentity,
    ApiPath(comment_id): ApiPath<CommentId>,
) -> BlogResult<StatusCode>
where
    A: AuthStore,
    B: BlogStore,
{
    state
        .comments()
        .delete(identity.identity(), comment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /comments/{comment_id}/replies
pub async fn list_replies<A, B>(
    State(state): State<BlogAppState<A, B>>,
    ApiPath(comment_id): ApiPath<CommentId>,
) -> BlogResult<impl IntoResponse>
where
    A: AuthStore,
    B: BlogStore,
{
    let replies = state.comments().replies(comment_id).await?;
    Ok(Success::ok(RepliesResponse {
        replies: replies.into_iter().map(CommentView::from).collect(),
    }))
}

/// POST /comments/{comment_id}/replies/create
pub async fn create_reply<A, B>(
    State(state): State<BlogAppState<A, B>>,
    identity: ResolvedIdentity,
    ApiPath(comment_id): ApiPath<CommentId>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> BlogResult<impl IntoResponse>
where
    A: AuthStore,
    B: BlogStore,
{
    let reply = state
        .comments()
        .reply(identity.identity(), comment_id, req.content)
        .await?;
    Ok(Success::created(CommentView::from(reply)))
}

// ============================================================================
// AI
// ============================================================================

/// POST /ai/generate
pub async fn generate<A, B>(
    State(state): State<BlogAppState<A, B>>,
    identity: ResolvedIdentity,
    ApiJson(req): ApiJson<GenerateRequest>,
) -> BlogResult<impl IntoResponse>
where
    A: AuthStore,
    B: BlogStore,
{
    let generated_content =
        GenerateUseCase::new(state.accounts.clone(), state.outbound.generator.clone())
            .execute(identity.identity(), req.into())
            .await?;

    Ok(Success::ok(GenerateResponse { generated_content }))
}
