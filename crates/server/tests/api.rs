use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{ServerState, router};

struct TestApp {
    app: Router,
    ann: i64,
    bob: i64,
}

async fn test_app() -> TestApp {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();

    let ann = engine
        .create_user("ann", "ann@example.org", "hashed")
        .await
        .unwrap()
        .id;
    let bob = engine
        .create_user("bob", "bob@example.org", "hashed")
        .await
        .unwrap()
        .id;

    TestApp {
        app: router(ServerState::new(engine), Duration::from_secs(30)),
        ann,
        bob,
    }
}

impl TestApp {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        user_id: Option<i64>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header("x-user-id", user_id.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

#[tokio::test]
async fn missing_or_malformed_user_header_is_unauthorized() {
    let t = test_app().await;

    let (status, _) = t.send(Method::GET, "/user", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/user")
        .header("x-user-id", "ann")
        .body(Body::empty())
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn current_user_is_returned() {
    let t = test_app().await;

    let (status, body) = t.send(Method::GET, "/user", Some(t.ann), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "ann");
    assert_eq!(body["email"], "ann@example.org");
    assert!(body.get("hashed_password").is_none());

    let (status, body) = t
        .send(
            Method::PATCH,
            "/user/name",
            Some(t.ann),
            Some(json!({ "name": "annie" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "annie");

    let (status, _) = t
        .send(
            Method::PATCH,
            "/user/email",
            Some(t.ann),
            Some(json!({ "email": "bob@example.org" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn trip_scenario_over_http() {
    let t = test_app().await;

    let (status, account) = t
        .send(
            Method::POST,
            "/accounts",
            Some(t.ann),
            Some(json!({ "name": "Trip" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let account_id = account["id"].as_i64().unwrap();

    let (status, rule) = t
        .send(
            Method::POST,
            &format!("/accounts/{account_id}/managers"),
            Some(t.ann),
            Some(json!({ "user_id": t.bob })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(rule["role"], "manager");

    let (status, _) = t
        .send(
            Method::POST,
            &format!("/accounts/{account_id}/managers"),
            Some(t.ann),
            Some(json!({ "user_id": t.bob })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, record) = t
        .send(
            Method::POST,
            &format!("/accounts/{account_id}/records"),
            Some(t.bob),
            Some(json!({
                "name": "Taxi",
                "kind": "commuting",
                "date": "2026-10-18",
                "amount": "12.50",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["amount"], "12.50");
    assert_eq!(record["create_user_id"], t.bob);

    let (status, body) = t
        .send(
            Method::GET,
            &format!("/accounts/{account_id}/records/sum"),
            Some(t.ann),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sum"], "12.50");

    let (status, _) = t
        .send(
            Method::PATCH,
            &format!("/accounts/{account_id}"),
            Some(t.bob),
            Some(json!({ "name": "Holiday" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = t
        .send(
            Method::DELETE,
            &format!("/accounts/{account_id}"),
            Some(t.ann),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = t
        .send(
            Method::GET,
            &format!("/accounts/{account_id}"),
            Some(t.ann),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = t
        .send(
            Method::GET,
            &format!("/accounts/{account_id}/records?page_id=1&page_size=5"),
            Some(t.ann),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn account_listings_and_counts() {
    let t = test_app().await;
    for name in ["Home", "Trip"] {
        t.send(
            Method::POST,
            "/accounts",
            Some(t.ann),
            Some(json!({ "name": name })),
        )
        .await;
    }

    let (status, body) = t
        .send(
            Method::GET,
            "/accounts?role=owner&page_id=1&page_size=5",
            Some(t.ann),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Home", "Trip"]);

    let (status, body) = t
        .send(
            Method::GET,
            "/accounts/count?role=manager",
            Some(t.ann),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    let (status, _) = t
        .send(
            Method::GET,
            "/accounts?role=owner&page_id=1&page_size=50",
            Some(t.ann),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = t
        .send(
            Method::GET,
            &format!("/accounts?role=owner&page_id={}&page_size=20", u64::MAX),
            Some(t.ann),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn revoking_the_owner_is_conflict() {
    let t = test_app().await;
    let (_, account) = t
        .send(
            Method::POST,
            "/accounts",
            Some(t.ann),
            Some(json!({ "name": "Home" })),
        )
        .await;
    let account_id = account["id"].as_i64().unwrap();

    let (status, _) = t
        .send(
            Method::DELETE,
            &format!("/accounts/{account_id}/managers/{}", t.ann),
            Some(t.ann),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = t
        .send(
            Method::GET,
            &format!("/accounts/{account_id}/users/count?role=owner"),
            Some(t.ann),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn invalid_amount_is_rejected() {
    let t = test_app().await;
    let (_, account) = t
        .send(
            Method::POST,
            "/accounts",
            Some(t.ann),
            Some(json!({ "name": "Home" })),
        )
        .await;
    let account_id = account["id"].as_i64().unwrap();

    let (status, _) = t
        .send(
            Method::POST,
            &format!("/accounts/{account_id}/records"),
            Some(t.ann),
            Some(json!({
                "name": "Bread",
                "kind": "food",
                "date": "2026-10-18",
                "amount": "1e3",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
