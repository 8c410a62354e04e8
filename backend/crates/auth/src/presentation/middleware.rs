//! Session Middleware
//!
//! Resolves the session cookie once per request and stores the result in
//! request extensions. Handlers take it back out with the
//! [`ResolvedIdentity`] extractor and pass it explicitly to the access gate.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::config::AuthConfig;
use crate::application::{CheckSessionUseCase, Identity};
use crate::domain::repository::SessionRepository;

/// Middleware state
#[derive(Clone)]
pub struct SessionResolver<S>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<S>,
    pub config: Arc<AuthConfig>,
}

impl<S> SessionResolver<S>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }
}

/// The session identity for this request, if any
#[derive(Debug, Clone, Default)]
pub struct ResolvedIdentity(pub Option<Identity>);

impl ResolvedIdentity {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

/// Middleware that resolves the session cookie but never requires it
pub async fn resolve_session<S>(
    State(state): State<SessionResolver<S>>,
    mut req: Request,
    next: Next,
) -> Response
where
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    let token = platform::cookie::extract_cookie(req.headers(), &state.config.session_cookie_name);

    let identity = match token {
        Some(token) => {
            let use_case = CheckSessionUseCase::new(state.repo.clone(), state.config.clone());
            match use_case.resolve(&token).await {
                Ok(identity) => identity,
                Err(e) => return e.into_response(),
            }
        }
        None => None,
    };

    req.extensions_mut().insert(ResolvedIdentity(identity));

    next.run(req).await
}

impl<S> FromRequestParts<S> for ResolvedIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<ResolvedIdentity>()
            .cloned()
            .unwrap_or_default())
    }
}
