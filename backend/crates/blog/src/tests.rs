//! HTTP tests for the blog crate
//!
//! The auth and blog routers are merged over shared in-memory stores, the
//! way the API binary merges them over PostgreSQL.

#[cfg(test)]
mod support {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use auth::domain::directory::DisabledDirectory;
    use auth::{AuthConfig, InMemoryAuthStore, Outbound, auth_router_generic};
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use kernel::id::AccountId;
    use platform::mail::{DeliveryError, Mailer, OutboundEmail};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::application::{BlogConfig, BlogOutbound};
    use crate::domain::generator::{ContentGenerator, GenerationError};
    use crate::infra::memory::InMemoryBlogStore;
    use crate::presentation::blog_router_generic;

    #[derive(Clone, Default)]
    pub struct RecordingMailer {
        pub sent: Arc<Mutex<Vec<OutboundEmail>>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: OutboundEmail) -> Result<(), DeliveryError> {
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }

    impl RecordingMailer {
        /// Wait for a message to `to` whose subject starts with `subject`
        pub async fn wait_for(&self, to: &str, subject: &str) -> OutboundEmail {
            for _ in 0..200 {
                {
                    let mut sent = self.sent.lock().unwrap();
                    if let Some(pos) = sent
                        .iter()
                        .position(|m| m.to == to && m.subject.starts_with(subject))
                    {
                        return sent.remove(pos);
                    }
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            panic!("no '{subject}' mail delivered to {to}");
        }

        pub fn count_to(&self, to: &str) -> usize {
            self.sent.lock().unwrap().iter().filter(|m| m.to == to).count()
        }
    }

    /// Echoes the prompt, or fails when built with `failing`
    pub struct ScriptedGenerator {
        pub failing: bool,
    }

    #[async_trait]
    impl ContentGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            if self.failing {
                Err(GenerationError::Empty)
            } else {
                Ok(format!("generated: {prompt}"))
            }
        }
    }

    pub struct Harness {
        pub app: Router,
        pub accounts: InMemoryAuthStore,
        pub mailer: RecordingMailer,
    }

    pub fn harness_with(failing_generator: bool) -> Harness {
        let accounts = InMemoryAuthStore::new();
        let mailer = RecordingMailer::default();
        let auth_config = AuthConfig::development();

        let auth = auth_router_generic(
            accounts.clone(),
            auth_config.clone(),
            Outbound::new(Arc::new(mailer.clone()), None, Arc::new(DisabledDirectory)),
        );
        let blog = blog_router_generic(
            accounts.clone(),
            InMemoryBlogStore::new(),
            auth_config,
            BlogConfig::default(),
            BlogOutbound::new(
                Arc::new(mailer.clone()),
                Arc::new(ScriptedGenerator {
                    failing: failing_generator,
                }),
            ),
        );

        Harness {
            app: auth.merge(blog),
            accounts,
            mailer,
        }
    }

    pub fn harness() -> Harness {
        harness_with(false)
    }

    pub struct Reply {
        pub status: StatusCode,
        pub json: Value,
    }

    pub async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        Reply {
            status,
            json: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        }
    }

    /// Register a local account and sign in; returns the id and cookie
    pub async fn sign_up(h: &Harness, name: &str) -> (AccountId, String) {
        let reg = call(
            &h.app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "username": name,
                "email": format!("{name}@example.com"),
                "password": "password1"
            })),
        )
        .await;
        assert_eq!(reg.status, StatusCode::CREATED);
        let id = AccountId::new(reg.json["userId"].as_i64().unwrap());

        // Drain the verification mail so later waits see only notifications
        h.mailer
            .wait_for(&format!("{name}@example.com"), "Verify")
            .await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"username": name, "password": "password1", "type": "local"}).to_string(),
            ))
            .unwrap();
        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .unwrap()
            .to_string();

        (id, cookie)
    }

    /// Registered, signed in and verified
    pub async fn verified_user(h: &Harness, name: &str) -> (AccountId, String) {
        let (id, cookie) = sign_up(h, name).await;
        h.accounts.force_verify(id).await;
        (id, cookie)
    }
}

#[cfg(test)]
mod blog_tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::support::{call, harness, sign_up, verified_user};

    #[tokio::test]
    async fn test_verification_unlocks_blog_creation() {
        let h = harness();
        let (id, cookie) = sign_up(&h, "alice").await;
        let post = json!({"title": "Hello", "content": "<p>First post</p>"});

        let blocked = call(&h.app, Method::POST, "/blogs/create", Some(&cookie), Some(post.clone())).await;
        assert_eq!(blocked.status, StatusCode::FORBIDDEN);
        assert_eq!(
            blocked.json["message"],
            "Verification required. Please verify either your email or phone number."
        );

        let requested = call(&h.app, Method::POST, "/auth/request-otp", Some(&cookie), None).await;
        assert_eq!(requested.status, StatusCode::OK);
        let mail = h.mailer.wait_for("alice@example.com", "Verify").await;
        let code: String = mail
            .body
            .split(|c: char| !c.is_ascii_digit())
            .find(|run| run.len() == 6)
            .unwrap()
            .to_string();

        let verified = call(
            &h.app,
            Method::POST,
            "/auth/verify-otp",
            None,
            Some(json!({"userId": id.get(), "otp": code})),
        )
        .await;
        assert_eq!(verified.status, StatusCode::OK);

        let created = call(&h.app, Method::POST, "/blogs/create", Some(&cookie), Some(post)).await;
        assert_eq!(created.status, StatusCode::CREATED);
        assert_eq!(created.json["status"], "success");
        assert_eq!(created.json["title"], "Hello");
        assert_eq!(created.json["author"], "alice");
        assert_eq!(created.json["userId"], id.get());
    }

    #[tokio::test]
    async fn test_anonymous_writes_are_rejected() {
        let h = harness();

        let reply = call(
            &h.app,
            Method::POST,
            "/blogs/create",
            None,
            Some(json!({"title": "x", "content": "y"})),
        )
        .await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

        let list = call(&h.app, Method::GET, "/blogs-api", None, None).await;
        assert_eq!(list.json["blogs"], json!([]));
    }

    #[tokio::test]
    async fn test_create_sanitizes_and_validates() {
        let h = harness();
        let (_, cookie) = verified_user(&h, "alice").await;

        let missing = call(
            &h.app,
            Method::POST,
            "/blogs/create",
            Some(&cookie),
            Some(json!({"title": "only a title"})),
        )
        .await;
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
        assert_eq!(missing.json["message"], "Title and content are required");

        let emptied = call(
            &h.app,
            Method::POST,
            "/blogs/create",
            Some(&cookie),
            Some(json!({"title": "<script>x</script>", "content": "body"})),
        )
        .await;
        assert_eq!(emptied.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            emptied.json["message"],
            "Title and content are required after sanitization"
        );

        let cleaned = call(
            &h.app,
            Method::POST,
            "/blogs/create",
            Some(&cookie),
            Some(json!({
                "title": "<b>Bold</b> move",
                "content": "<p onclick=\"x()\">hi</p><script>alert(1)</script>"
            })),
        )
        .await;
        assert_eq!(cleaned.status, StatusCode::CREATED);
        assert_eq!(cleaned.json["title"], "Bold move");
        assert_eq!(cleaned.json["content"], "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_ownership_is_enforced() {
        let h = harness();
        let (_, alice) = verified_user(&h, "alice").await;
        let (_, bob) = verified_user(&h, "bob").await;

        let created = call(
            &h.app,
            Method::POST,
            "/blogs/create",
            Some(&alice),
            Some(json!({"title": "Mine", "content": "text"})),
        )
        .await;
        let blog_id = created.json["blogId"].as_i64().unwrap();
        let edit = json!({"title": "Taken", "content": "over"});

        let forbidden = call(
            &h.app,
            Method::PUT,
            &format!("/blogs/{blog_id}/update"),
            Some(&bob),
            Some(edit.clone()),
        )
        .await;
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
        assert_eq!(
            forbidden.json["message"],
            "You do not have permission to modify this blog"
        );

        let missing = call(
            &h.app,
            Method::PUT,
            "/blogs/999/update",
            Some(&alice),
            Some(edit.clone()),
        )
        .await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.json["message"], "Blog not found");

        let unchanged = call(&h.app, Method::GET, &format!("/blogs-api/{blog_id}"), None, None).await;
        assert_eq!(unchanged.json["title"], "Mine");

        let updated = call(
            &h.app,
            Method::PUT,
            &format!("/blogs/{blog_id}/update"),
            Some(&alice),
            Some(edit),
        )
        .await;
        assert_eq!(updated.status, StatusCode::OK);
        assert_eq!(updated.json["title"], "Taken");

        let not_hers = call(
            &h.app,
            Method::DELETE,
            &format!("/blogs/{blog_id}/delete"),
            Some(&bob),
            None,
        )
        .await;
        assert_eq!(not_hers.status, StatusCode::FORBIDDEN);

        let deleted = call(
            &h.app,
            Method::DELETE,
            &format!("/blogs/{blog_id}/delete"),
            Some(&alice),
            None,
        )
        .await;
        assert_eq!(deleted.status, StatusCode::NO_CONTENT);

        let gone = call(&h.app, Method::GET, &format!("/blogs-api/{blog_id}"), None, None).await;
        assert_eq!(gone.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_listing_filters() {
        let h = harness();
        let (alice_id, alice) = verified_user(&h, "alice").await;
        let (_, bob) = verified_user(&h, "bob").await;

        for (cookie, title) in [(&alice, "a1"), (&bob, "b1"), (&alice, "a2")] {
            call(
                &h.app,
                Method::POST,
                "/blogs/create",
                Some(cookie),
                Some(json!({"title": title, "content": "text"})),
            )
            .await;
        }

        let all = call(&h.app, Method::GET, "/blogs-api", None, None).await;
        assert_eq!(all.json["blogs"].as_array().unwrap().len(), 3);
        assert_eq!(all.json["blogs"][0]["title"], "a2");

        let by_bob = call(&h.app, Method::GET, "/blogs-api?author=bob", None, None).await;
        assert_eq!(by_bob.json["blogs"].as_array().unwrap().len(), 1);

        let paged = call(&h.app, Method::GET, "/blogs-api?limit=1&offset=1", None, None).await;
        assert_eq!(paged.json["blogs"][0]["title"], "b1");

        let old = call(&h.app, Method::GET, "/blogs-api?newerThan=2000-01-01", None, None).await;
        assert_eq!(old.json["blogs"].as_array().unwrap().len(), 3);

        let future = call(&h.app, Method::GET, "/blogs-api?newerThan=2999-01-01", None, None).await;
        assert_eq!(future.json["blogs"], json!([]));

        let bad = call(&h.app, Method::GET, "/blogs-api?newerThan=yesterday", None, None).await;
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.json["message"], "Invalid date format. Use YYYY-MM-DD");

        let hers = call(
            &h.app,
            Method::GET,
            &format!("/users-api/{}/blogs", alice_id.get()),
            None,
            None,
        )
        .await;
        assert_eq!(hers.json["blogs"].as_array().unwrap().len(), 2);

        let nobody = call(&h.app, Method::GET, "/users-api/999/blogs", None, None).await;
        assert_eq!(nobody.status, StatusCode::NOT_FOUND);
        assert_eq!(nobody.json["message"], "User not found");
    }

    #[tokio::test]
    async fn test_new_post_notifies_opted_in_accounts() {
        let h = harness();
        let (_, alice) = verified_user(&h, "alice").await;
        let (_, _bob) = verified_user(&h, "bob").await;
        let (_, carol) = verified_user(&h, "carol").await;

        let opt_out = call(
            &h.app,
            Method::PUT,
            "/users/notification-preferences",
            Some(&carol),
            Some(json!({"notifyOnBlog": false, "notifyOnComment": true})),
        )
        .await;
        assert_eq!(opt_out.status, StatusCode::OK);

        call(
            &h.app,
            Method::POST,
            "/blogs/create",
            Some(&alice),
            Some(json!({"title": "Launch", "content": "<p>We shipped</p>"})),
        )
        .await;

        let mail = h
            .mailer
            .wait_for("bob@example.com", "New Blog Post: Launch")
            .await;
        assert!(mail.body.contains("alice just published"));
        assert!(mail.body.contains("We shipped"));

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(h.mailer.count_to("carol@example.com"), 0);
        assert_eq!(h.mailer.count_to("alice@example.com"), 0);
    }
}

#[cfg(test)]
mod comment_tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::support::{call, harness, verified_user};

    #[tokio::test]
    async fn test_comment_thread_and_notifications() {
        let h = harness();
        let (_, alice) = verified_user(&h, "alice").await;
        let (_, bob) = verified_user(&h, "bob").await;

        let blog = call(
            &h.app,
            Method::POST,
            "/blogs/create",
            Some(&alice),
            Some(json!({"title": "Threads", "content": "text"})),
        )
        .await;
        let blog_id = blog.json["blogId"].as_i64().unwrap();
        // Bob's new-post mail
        h.mailer.wait_for("bob@example.com", "New Blog Post").await;

        let comment = call(
            &h.app,
            Method::POST,
            &format!("/blogs/{blog_id}/comments/create"),
            Some(&bob),
            Some(json!({"content": "<p>Great read</p>"})),
        )
        .await;
        assert_eq!(comment.status, StatusCode::CREATED);
        assert_eq!(comment.json["parentCommentId"], serde_json::Value::Null);
        let comment_id = comment.json["commentId"].as_i64().unwrap();

        let mail = h
            .mailer
            .wait_for("alice@example.com", "New Comment on Your Blog: Threads")
            .await;
        assert!(mail.body.contains("bob just commented"));

        let reply = call(
            &h.app,
            Method::POST,
            &format!("/comments/{comment_id}/replies/create"),
            Some(&alice),
            Some(json!({"content": "Thanks!"})),
        )
        .await;
        assert_eq!(reply.status, StatusCode::CREATED);
        assert_eq!(reply.json["parentCommentId"], comment_id);
        assert_eq!(reply.json["blogId"], blog_id);

        h.mailer
            .wait_for("bob@example.com", "New Comment on Your Blog: Threads")
            .await;

        let replies = call(
            &h.app,
            Method::GET,
            &format!("/comments/{comment_id}/replies"),
            None,
            None,
        )
        .await;
        assert_eq!(replies.json["replies"].as_array().unwrap().len(), 1);

        let all = call(
            &h.app,
            Method::GET,
            &format!("/blogs-api/{blog_id}/comments"),
            None,
            None,
        )
        .await;
        assert_eq!(all.json["comments"].as_array().unwrap().len(), 2);
        assert_eq!(all.json["comments"][0]["content"], "<p>Great read</p>");
    }

    #[tokio::test]
    async fn test_comment_errors_and_ownership() {
        let h = harness();
        let (_, alice) = verified_user(&h, "alice").await;
        let (_, bob) = verified_user(&h, "bob").await;

        let no_blog = call(
            &h.app,
            Method::POST,
            "/blogs/42/comments/create",
            Some(&bob),
            Some(json!({"content": "hello"})),
        )
        .await;
        assert_eq!(no_blog.status, StatusCode::NOT_FOUND);
        assert_eq!(no_blog.json["message"], "Blog not found");

        let blog = call(
            &h.app,
            Method::POST,
            "/blogs/create",
            Some(&alice),
            Some(json!({"title": "Post", "content": "text"})),
        )
        .await;
        let blog_id = blog.json["blogId"].as_i64().unwrap();

        let empty = call(
            &h.app,
            Method::POST,
            &format!("/blogs/{blog_id}/comments/create"),
            Some(&bob),
            Some(json!({"content": "<script>x</script>"})),
        )
        .await;
        assert_eq!(empty.status, StatusCode::BAD_REQUEST);
        assert_eq!(empty.json["message"], "Content is required after sanitization");

        let comment = call(
            &h.app,
            Method::POST,
            &format!("/blogs/{blog_id}/comments/create"),
            Some(&bob),
            Some(json!({"content": "first"})),
        )
        .await;
        let comment_id = comment.json["commentId"].as_i64().unwrap();

        let hijack = call(
            &h.app,
            Method::PUT,
            &format!("/comments/{comment_id}/update"),
            Some(&alice),
            Some(json!({"content": "edited"})),
        )
        .await;
        assert_eq!(hijack.status, StatusCode::FORBIDDEN);
        assert_eq!(
            hijack.json["message"],
            "You do not have permission to modify this comment"
        );

        let edited = call(
            &h.app,
            Method::PUT,
            &format!("/comments/{comment_id}/update"),
            Some(&bob),
            Some(json!({"content": "edited"})),
        )
        .await;
        assert_eq!(edited.status, StatusCode::OK);
        assert_eq!(edited.json["content"], "edited");

        let deleted = call(
            &h.app,
            Method::DELETE,
            &format!("/comments/{comment_id}/delete"),
            Some(&bob),
            None,
        )
        .await;
        assert_eq!(deleted.status, StatusCode::NO_CONTENT);

        let gone = call(&h.app, Method::GET, &format!("/comments/{comment_id}"), None, None).await;
        assert_eq!(gone.status, StatusCode::NOT_FOUND);
        assert_eq!(gone.json["message"], "Comment not found");

        let no_parent = call(&h.app, Method::GET, "/comments/777/replies", None, None).await;
        assert_eq!(no_parent.status, StatusCode::NOT_FOUND);
    }
}

#[cfg(test)]
mod generate_tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::support::{call, harness, harness_with, sign_up, verified_user};

    #[tokio::test]
    async fn test_generation_requires_verified_session() {
        let h = harness();

        let anonymous = call(
            &h.app,
            Method::POST,
            "/ai/generate",
            None,
            Some(json!({"prompt": "hi"})),
        )
        .await;
        assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

        let (_, cookie) = sign_up(&h, "alice").await;
        let unverified = call(
            &h.app,
            Method::POST,
            "/ai/generate",
            Some(&cookie),
            Some(json!({"prompt": "hi"})),
        )
        .await;
        assert_eq!(unverified.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_generate_and_enhance() {
        let h = harness();
        let (_, cookie) = verified_user(&h, "alice").await;

        let generated = call(
            &h.app,
            Method::POST,
            "/ai/generate",
            Some(&cookie),
            Some(json!({"prompt": "a haiku"})),
        )
        .await;
        assert_eq!(generated.status, StatusCode::OK);
        assert_eq!(generated.json["generatedContent"], "generated: a haiku");

        let missing = call(
            &h.app,
            Method::POST,
            "/ai/generate",
            Some(&cookie),
            Some(json!({"prompt": "tighten", "mode": "enhance"})),
        )
        .await;
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
        assert_eq!(missing.json["message"], "Content is required when mode is enhance");

        let enhanced = call(
            &h.app,
            Method::POST,
            "/ai/generate",
            Some(&cookie),
            Some(json!({"prompt": "tighten", "mode": "enhance", "content": "draft"})),
        )
        .await;
        let text = enhanced.json["generatedContent"].as_str().unwrap();
        assert!(text.contains("preserving the main ideas: draft"));
        assert!(text.ends_with("Enhancement instructions: tighten"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_server_error() {
        let h = harness_with(true);
        let (_, cookie) = verified_user(&h, "alice").await;

        let failed = call(
            &h.app,
            Method::POST,
            "/ai/generate",
            Some(&cookie),
            Some(json!({"prompt": "anything"})),
        )
        .await;
        assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failed.json["status"], "error");
        assert_eq!(failed.json["message"], "Failed to generate content");
    }
}
