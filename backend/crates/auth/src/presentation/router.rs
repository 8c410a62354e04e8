//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::application::{config::AuthConfig, outbound::Outbound};
use crate::domain::repository::AuthStore;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{SessionResolver, resolve_session};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig, outbound: Outbound) -> Router {
    auth_router_generic(repo, config, outbound)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R>(repo: R, config: AuthConfig, outbound: Outbound) -> Router
where
    R: AuthStore,
{
    let repo = Arc::new(repo);
    let config = Arc::new(config);
    let resolver = SessionResolver::new(repo.clone(), config.clone());
    let state = AuthAppState {
        repo,
        config,
        outbound,
    };

    Router::new()
        .route("/auth/register", post(handlers::register::<R>))
        .route(
            "/auth/login",
            post(handlers::login::<R>).get(handlers::who_am_i::<R>),
        )
        .route("/auth/logout", post(handlers::logout::<R>))
        .route("/auth/request-otp", post(handlers::request_otp::<R>))
        .route("/auth/verify-otp", post(handlers::verify_otp::<R>))
        .route(
            "/auth/request-mobile-otp",
            post(handlers::request_mobile_otp::<R>),
        )
        .route(
            "/auth/verify-mobile-otp",
            post(handlers::verify_mobile_otp::<R>),
        )
        .route("/auth/forgot-password", post(handlers::forgot_password::<R>))
        .route("/auth/verify-reset-otp", post(handlers::verify_reset_otp::<R>))
        .route("/auth/reset-password", post(handlers::reset_password::<R>))
        // Legacy aliases
        .route(
            "/user/login",
            post(handlers::login::<R>).get(handlers::who_am_i::<R>),
        )
        .route("/user/logout", post(handlers::logout::<R>))
        // Users
        .route("/users", get(handlers::list_users::<R>))
        .route("/users-api/{user_id}", get(handlers::get_user::<R>))
        .route("/users/email", put(handlers::change_email::<R>))
        .route("/users/phone", put(handlers::change_phone::<R>))
        .route(
            "/users/notification-preferences",
            get(handlers::get_preferences::<R>).put(handlers::put_preferences::<R>),
        )
        .layer(middleware::from_fn_with_state(resolver, resolve_session::<R>))
        .with_state(state)
}
