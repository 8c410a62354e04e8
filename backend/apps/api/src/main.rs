//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod settings;

use auth::{Outbound, PgAuthRepository, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use blog::{BlogOutbound, PgBlogRepository, blog_router};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,blog=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings::database_url()?)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: expired sessions and long-dead codes
    // Errors here should not prevent server startup
    let accounts = PgAuthRepository::new(pool.clone());
    if let Err(e) = accounts.cleanup_expired().await {
        tracing::warn!(error = %e, "Auth cleanup failed, continuing anyway");
    }

    // Configuration and outbound collaborators
    let auth_config = settings::auth_config()?;
    tracing::info!(
        mobile_verification = auth_config.mobile_verification_enabled,
        cookie_secure = auth_config.cookie_secure,
        "Auth configured"
    );

    let mailer = settings::mailer();
    let outbound = Outbound::new(mailer.clone(), settings::sms(), settings::directory());
    let blog_outbound = BlogOutbound::new(mailer, settings::generator());

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = settings::frontend_origins()
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .merge(auth_router(accounts.clone(), auth_config.clone(), outbound))
        .merge(blog_router(
            accounts,
            PgBlogRepository::new(pool.clone()),
            auth_config,
            settings::blog_config(),
            blog_outbound,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = settings::bind_addr().parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
