use chrono::Utc;
use http_body_util::BodyExt;
use std::str::FromStr;

use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE},
        Method, Request, StatusCode,
    },
    Router,
};
use notifyhub_api::{build_router, AppState};
use notifyhub_auth::{Authenticator, TokenIssuer};
use notifyhub_config::AppConfig;
use notifyhub_database::{CreateNotificationRequest, NotificationRepository, MIGRATOR};
use serde_json::{json, Value};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tempfile::TempDir;
use tower::ServiceExt;

type TestResult<T = ()> = anyhow::Result<T>;

struct TestContext {
    _temp_dir: TempDir,
    pool: SqlitePool,
    state: AppState,
    config: AppConfig,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("api.sqlite");
        let db_url = format!("sqlite://{}", db_path.display());

        let options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;

        let config = AppConfig::default();
        let authenticator = Authenticator::new(pool.clone(), &config.auth);
        let state = AppState::new(authenticator, NotificationRepository::new(pool.clone()));

        Ok(Self {
            _temp_dir: temp_dir,
            pool,
            state,
            config,
        })
    }

    fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    async fn send(&self, request: Request<Body>) -> TestResult<(StatusCode, Value)> {
        let response = self.router().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }

    async fn subscribe(&self, email: &str, password: &str, preferences: Value) -> TestResult<StatusCode> {
        let (status, _) = self
            .send(json_request(
                Method::POST,
                "/subscribe",
                None,
                json!({ "email": email, "password": password, "preferences": preferences }),
            ))
            .await?;
        Ok(status)
    }

    async fn login(&self, email: &str, password: &str) -> TestResult<String> {
        let (status, body) = self.send(token_request(email, password)).await?;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        Ok(body["access_token"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("missing access_token"))?
            .to_string())
    }

    async fn subscribed_user(&self, email: &str, preferences: Value) -> TestResult<String> {
        assert_eq!(self.subscribe(email, "s3cret", preferences).await?, StatusCode::OK);
        self.login(email, "s3cret").await
    }

    async fn public_id(&self, email: &str) -> TestResult<String> {
        Ok(sqlx::query_scalar("SELECT public_id FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?)
    }
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn token_request(username: &str, password: &str) -> Request<Body> {
    let form = format!(
        "grant_type=password&username={}&password={}",
        username.replace('@', "%40"),
        password
    );
    Request::builder()
        .method(Method::POST)
        .uri("/token")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() -> TestResult {
    let ctx = TestContext::new().await?;
    let (status, body) = ctx.send(get_request("/health", None)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
    assert!(body["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn subscribe_confirms_and_counts_in_stats() -> TestResult {
    let ctx = TestContext::new().await?;

    let (status, body) = ctx
        .send(json_request(
            Method::POST,
            "/subscribe",
            None,
            json!({ "email": "alice@example.com", "password": "s3cret" }),
        ))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Subscribed successfully" }));

    let (status, body) = ctx.send(get_request("/stats", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "subscribers": 1 }));
    Ok(())
}

#[tokio::test]
async fn subscribe_twice_conflicts() -> TestResult {
    let ctx = TestContext::new().await?;
    assert_eq!(
        ctx.subscribe("alice@example.com", "s3cret", json!({})).await?,
        StatusCode::OK
    );

    let (status, body) = ctx
        .send(json_request(
            Method::POST,
            "/subscribe",
            None,
            json!({ "email": "alice@example.com", "password": "other" }),
        ))
        .await?;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User already exists");
    Ok(())
}

#[tokio::test]
async fn subscribe_rejects_invalid_input() -> TestResult {
    let ctx = TestContext::new().await?;

    assert_eq!(
        ctx.subscribe("not-an-email", "s3cret", json!({})).await?,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        ctx.subscribe("alice@example.com", "", json!({})).await?,
        StatusCode::BAD_REQUEST
    );
    Ok(())
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.subscribe("alice@example.com", "s3cret", json!({})).await?;

    let response = ctx
        .router()
        .oneshot(token_request("alice@example.com", "wrong"))
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(WWW_AUTHENTICATE).map(|v| v.as_bytes()),
        Some(&b"Bearer"[..])
    );
    Ok(())
}

#[tokio::test]
async fn login_issues_bearer_token() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.subscribe("alice@example.com", "s3cret", json!({})).await?;

    let (status, body) = ctx.send(token_request("alice@example.com", "s3cret")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_bearer_token() -> TestResult {
    let ctx = TestContext::new().await?;

    for request in [
        json_request(Method::POST, "/unsubscribe", None, json!({})),
        json_request(Method::POST, "/preferences", None, json!({})),
        get_request("/notifications", None),
        get_request("/get-token", None),
        get_request("/notifications", Some("forged.token.value")),
    ] {
        let response = ctx.router().oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(WWW_AUTHENTICATE));
    }
    Ok(())
}

#[tokio::test]
async fn expired_token_is_unauthorized() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.subscribe("alice@example.com", "s3cret", json!({})).await?;

    let expired = TokenIssuer::new(
        &ctx.config.auth.secret,
        ctx.config.auth.issuer.clone(),
        chrono::Duration::minutes(-10),
    )
    .issue("alice@example.com")?;

    let (status, _) = ctx
        .send(get_request("/notifications", Some(&expired.access_token)))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn unsubscribe_clears_flag_and_stats() -> TestResult {
    let ctx = TestContext::new().await?;
    let token = ctx.subscribed_user("alice@example.com", json!({})).await?;
    ctx.subscribed_user("bob@example.com", json!({})).await?;

    let (status, body) = ctx
        .send(json_request(Method::POST, "/unsubscribe", Some(&token), json!({})))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Unsubscribed successfully" }));

    let subscribed: bool = sqlx::query_scalar("SELECT subscribed FROM users WHERE email = ?")
        .bind("alice@example.com")
        .fetch_one(&ctx.pool)
        .await?;
    assert!(!subscribed);

    let (_, stats) = ctx.send(get_request("/stats", None)).await?;
    assert_eq!(stats, json!({ "subscribers": 1 }));
    Ok(())
}

#[tokio::test]
async fn preferences_are_replaced_wholesale() -> TestResult {
    let ctx = TestContext::new().await?;
    let token = ctx
        .subscribed_user(
            "alice@example.com",
            json!({ "topic": ["tech"], "priority": ["high"], "category": ["alert"] }),
        )
        .await?;

    let (status, body) = ctx
        .send(json_request(
            Method::POST,
            "/preferences",
            Some(&token),
            json!({ "topic": ["sports", "news"] }),
        ))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Preferences updated successfully" }));

    let stored: String = sqlx::query_scalar("SELECT preferences FROM users WHERE email = ?")
        .bind("alice@example.com")
        .fetch_one(&ctx.pool)
        .await?;
    let stored: Value = serde_json::from_str(&stored)?;
    assert_eq!(stored["topic"], json!(["sports", "news"]));
    assert_eq!(stored["priority"], json!([]));
    assert_eq!(stored["category"], json!([]));
    Ok(())
}

#[tokio::test]
async fn notifications_lists_only_callers_newest_first() -> TestResult {
    let ctx = TestContext::new().await?;
    let token = ctx.subscribed_user("alice@example.com", json!({})).await?;
    ctx.subscribed_user("bob@example.com", json!({})).await?;

    let alice = ctx.public_id("alice@example.com").await?;
    let bob = ctx.public_id("bob@example.com").await?;
    let repo = NotificationRepository::new(ctx.pool.clone());

    let mut expected = Vec::new();
    for (topic, recipients) in [
        ("tech", vec![alice.clone(), bob.clone()]),
        ("sports", vec![bob.clone()]),
        ("news", vec![alice.clone()]),
    ] {
        let created = repo
            .create(&CreateNotificationRequest {
                topic: topic.into(),
                release_time: Utc::now(),
                priority: "high".into(),
                category: "alert".into(),
                sent_to: recipients.clone(),
            })
            .await?;
        if recipients.contains(&alice) {
            expected.push(created.id);
        }
    }
    expected.reverse();

    let (status, body) = ctx.send(get_request("/notifications", Some(&token))).await?;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<i64> = body
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("expected array"))?
        .iter()
        .filter_map(|n| n["id"].as_i64())
        .collect();
    assert_eq!(ids, expected);
    assert_eq!(body[0]["topic"], "news");
    assert_eq!(body[0]["sent_to"], json!([alice]));
    Ok(())
}

#[tokio::test]
async fn notifications_are_capped_at_one_hundred() -> TestResult {
    let ctx = TestContext::new().await?;
    let token = ctx.subscribed_user("alice@example.com", json!({})).await?;
    let alice = ctx.public_id("alice@example.com").await?;
    let repo = NotificationRepository::new(ctx.pool.clone());

    for _ in 0..105 {
        repo.create(&CreateNotificationRequest {
            topic: "tech".into(),
            release_time: Utc::now(),
            priority: "low".into(),
            category: "general".into(),
            sent_to: vec![alice.clone()],
        })
        .await?;
    }

    let (status, body) = ctx.send(get_request("/notifications", Some(&token))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(100));
    Ok(())
}

#[tokio::test]
async fn get_token_echoes_presented_token() -> TestResult {
    let ctx = TestContext::new().await?;
    let token = ctx.subscribed_user("alice@example.com", json!({})).await?;

    let (status, body) = ctx.send(get_request("/get-token", Some(&token))).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "access_token": token, "token_type": "bearer" }));
    Ok(())
}

#[tokio::test]
async fn openapi_document_lists_endpoints() -> TestResult {
    let ctx = TestContext::new().await?;
    let (status, body) = ctx.send(get_request("/api-docs/openapi.json", None)).await?;

    assert_eq!(status, StatusCode::OK);
    for path in [
        "/subscribe",
        "/unsubscribe",
        "/preferences",
        "/stats",
        "/notifications",
        "/token",
        "/get-token",
    ] {
        assert!(body["paths"][path].is_object(), "missing {path}");
    }
    Ok(())
}
