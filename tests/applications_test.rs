//! Job-application CRUD over the HTTP surface, including ownership checks.

mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{RequestSpec, access_token, send};
use jobtrail::testing::{self, TestContext};

async fn login(router: &axum::Router, email: &str) -> String {
    let response = send(
        router,
        RequestSpec::new("POST", "/auth/login").json(json!({
            "email": email,
            "password": "Secret1!",
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    access_token(&response.body)
}

fn application_body(url: &str) -> Value {
    json!({
        "companyName": "Acme",
        "jobUrl": url,
        "applicationDate": "2026-08-15",
        "status": "applied",
    })
}

#[tokio::test]
async fn applications_require_authentication() {
    let ctx = TestContext::new().await;
    let router = ctx.router();

    let list = send(&router, RequestSpec::new("GET", "/applications")).await;
    assert_eq!(list.status, StatusCode::UNAUTHORIZED);

    let create = send(
        &router,
        RequestSpec::new("POST", "/applications").json(application_body("https://a.com/1")),
    )
    .await;
    assert_eq!(create.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_list_and_duplicate_detection() {
    let ctx = TestContext::new().await;
    testing::insert_user(&ctx.db, "a@x.com", "Secret1!").await;
    let router = ctx.router();
    let token = login(&router, "a@x.com").await;

    let created = send(
        &router,
        RequestSpec::new("POST", "/applications")
            .bearer(&token)
            .json(application_body("https://jobs.acme.com/42")),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["companyName"], "Acme");
    assert_eq!(created.body["status"], "applied");

    let duplicate = send(
        &router,
        RequestSpec::new("POST", "/applications")
            .bearer(&token)
            .json(application_body("HTTPS://Jobs.Acme.com/42")),
    )
    .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(
        duplicate.body["message"],
        "You have already applied for this position"
    );

    let list = send(
        &router,
        RequestSpec::new("GET", "/applications").bearer(&token),
    )
    .await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn listing_is_ordered_by_application_date() {
    let ctx = TestContext::new().await;
    testing::insert_user(&ctx.db, "a@x.com", "Secret1!").await;
    let router = ctx.router();
    let token = login(&router, "a@x.com").await;

    for (url, date) in [
        ("https://a.com/old", "2026-01-01"),
        ("https://a.com/new", "2026-08-01"),
        ("https://a.com/mid", "2026-04-01"),
    ] {
        let mut body = application_body(url);
        body["applicationDate"] = json!(date);
        let created = send(
            &router,
            RequestSpec::new("POST", "/applications")
                .bearer(&token)
                .json(body),
        )
        .await;
        assert_eq!(created.status, StatusCode::CREATED);
    }

    let list = send(
        &router,
        RequestSpec::new("GET", "/applications").bearer(&token),
    )
    .await;
    let urls: Vec<&str> = list
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["jobUrl"].as_str().unwrap())
        .collect();
    assert_eq!(
        urls,
        vec!["https://a.com/new", "https://a.com/mid", "https://a.com/old"]
    );
}

#[tokio::test]
async fn check_endpoint_reports_existence() {
    let ctx = TestContext::new().await;
    testing::insert_user(&ctx.db, "a@x.com", "Secret1!").await;
    let router = ctx.router();
    let token = login(&router, "a@x.com").await;

    send(
        &router,
        RequestSpec::new("POST", "/applications")
            .bearer(&token)
            .json(application_body("https://jobs.acme.com/7")),
    )
    .await;

    let hit = send(
        &router,
        RequestSpec::new("GET", "/applications/check?url=https://jobs.acme.com/7").bearer(&token),
    )
    .await;
    assert_eq!(hit.status, StatusCode::OK);
    assert_eq!(hit.body["applied"], true);
    assert_eq!(hit.body["application"]["companyName"], "Acme");

    let miss = send(
        &router,
        RequestSpec::new("GET", "/applications/check?url=https://other.com").bearer(&token),
    )
    .await;
    assert_eq!(miss.body["applied"], false);
    assert_eq!(miss.body["application"], Value::Null);
}

#[tokio::test]
async fn update_and_delete_are_scoped_to_the_owner() {
    let ctx = TestContext::new().await;
    testing::insert_user(&ctx.db, "owner@x.com", "Secret1!").await;
    testing::insert_user(&ctx.db, "other@x.com", "Secret1!").await;
    let router = ctx.router();
    let owner = login(&router, "owner@x.com").await;
    let other = login(&router, "other@x.com").await;

    let created = send(
        &router,
        RequestSpec::new("POST", "/applications")
            .bearer(&owner)
            .json(application_body("https://jobs.acme.com/9")),
    )
    .await;
    let id = created.body["id"].as_i64().unwrap();

    let stolen_update = send(
        &router,
        RequestSpec::new("PUT", &format!("/applications/{id}"))
            .bearer(&other)
            .json(json!({ "status": "interview" })),
    )
    .await;
    assert_eq!(stolen_update.status, StatusCode::NOT_FOUND);

    let updated = send(
        &router,
        RequestSpec::new("PUT", &format!("/applications/{id}"))
            .bearer(&owner)
            .json(json!({ "status": "interview", "companyName": "Acme Corp" })),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["status"], "interview");
    assert_eq!(updated.body["companyName"], "Acme Corp");

    let stolen_delete = send(
        &router,
        RequestSpec::new("DELETE", &format!("/applications/{id}")).bearer(&other),
    )
    .await;
    assert_eq!(stolen_delete.status, StatusCode::NOT_FOUND);

    let deleted = send(
        &router,
        RequestSpec::new("DELETE", &format!("/applications/{id}")).bearer(&owner),
    )
    .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = send(
        &router,
        RequestSpec::new("DELETE", &format!("/applications/{id}")).bearer(&owner),
    )
    .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_validation_rejects_bad_input() {
    let ctx = TestContext::new().await;
    testing::insert_user(&ctx.db, "a@x.com", "Secret1!").await;
    let router = ctx.router();
    let token = login(&router, "a@x.com").await;

    let response = send(
        &router,
        RequestSpec::new("POST", "/applications")
            .bearer(&token)
            .json(json!({ "companyName": "", "jobUrl": "not-a-url" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let bad_date = send(
        &router,
        RequestSpec::new("POST", "/applications").bearer(&token).json(json!({
            "companyName": "Acme",
            "jobUrl": "https://a.com/1",
            "applicationDate": "soon",
        })),
    )
    .await;
    assert_eq!(bad_date.status, StatusCode::BAD_REQUEST);
}
