//! Blog Router

use auth::{AuthConfig, AuthStore, PgAuthRepository, SessionResolver, middleware::resolve_session};
use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

use crate::application::{BlogConfig, BlogOutbound};
use crate::domain::repository::BlogStore;
use crate::infra::postgres::PgBlogRepository;
use crate::presentation::handlers::{self, BlogAppState};

/// Create the Blog router with PostgreSQL repositories
pub fn blog_router(
    accounts: PgAuthRepository,
    store: PgBlogRepository,
    auth_config: AuthConfig,
    config: BlogConfig,
    outbound: BlogOutbound,
) -> Router {
    blog_router_generic(accounts, store, auth_config, config, outbound)
}

/// Create a generic Blog router for any repository implementation
pub fn blog_router_generic<A, B>(
    accounts: A,
    store: B,
    auth_config: AuthConfig,
    config: BlogConfig,
    outbound: BlogOutbound,
) -> Router
where
    A: AuthStore,
    B: BlogStore,
{
    let accounts = Arc::new(accounts);
    let resolver = SessionResolver::new(accounts.clone(), Arc::new(auth_config));
    let state = BlogAppState {
        accounts,
        store: Arc::new(store),
        config: Arc::new(config),
        outbound,
    };

    Router::new()
        // Blogs
        .route("/blogs-api", get(handlers::list_blogs::<A, B>))
        .route("/blogs-api/{blog_id}", get(handlers::get_blog::<A, B>))
        .route("/blogs/create", post(handlers::create_blog::<A, B>))
        .route("/blogs/{blog_id}/update", put(handlers::update_blog::<A, B>))
        .route(
            "/blogs/{blog_id}/delete",
            delete(handlers::delete_blog::<A, B>),
        )
        .route(
            "/users-api/{user_id}/blogs",
            get(handlers::list_user_blogs::<A, B>),
        )
        // Comments
        .route(
            "/blogs-api/{blog_id}/comments",
            get(handlers::list_comments::<A, B>),
        )
        .route(
            "/blogs/{blog_id}/comments/create",
            post(handlers::create_comment::<A, B>),
        )
        .route("/comments/{comment_id}", get(handlers::get_comment::<A, B>))
        .route(
            "/comments/{comment_id}/update",
            put(handlers::update_comment::<A, B>),
        )
        .route(
            "/comments/{comment_id}/delete",
            delete(handlers::delete_comment::<A, B>),
        )
        .route(
            "/comments/{comment_id}/replies",
            get(handlers::list_replies::<A, B>),
        )
        .route(
            "/comments/{comment_id}/replies/create",
            post(handlers::create_reply::<A, B>),
        )
        // AI
        .route("/ai/generate", post(handlers::generate::<A, B>))
        .layer(middleware::from_fn_with_state(resolver, resolve_session::<A>))
        .with_state(state)
}
