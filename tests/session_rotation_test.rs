//! Refresh-token rotation, revocation and expiry over the HTTP surface.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{RequestSpec, access_token, refresh_cookie, send};
use jobtrail::auth::refresh_store::RefreshTokenStore;
use jobtrail::testing::{self, TestContext};

async fn login(router: &axum::Router) -> (String, String) {
    let response = send(
        router,
        RequestSpec::new("POST", "/auth/login")
            .json(json!({ "email": "s@x.com", "password": "Secret1!" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let cookie = refresh_cookie(&response.headers).expect("login sets the refresh cookie");
    (access_token(&response.body), cookie)
}

#[tokio::test]
async fn refresh_rotates_the_cookie_and_kills_the_old_value() {
    let ctx = TestContext::new().await;
    testing::insert_user(&ctx.db, "s@x.com", "Secret1!").await;
    let router = ctx.router();
    let (_, cookie) = login(&router).await;

    let rotated = send(
        &router,
        RequestSpec::new("POST", "/auth/refresh").cookie(&cookie),
    )
    .await;
    assert_eq!(rotated.status, StatusCode::OK);
    let new_cookie = refresh_cookie(&rotated.headers).expect("refresh rotates the cookie");
    assert_ne!(new_cookie, cookie);

    // The new access token is usable.
    let token = access_token(&rotated.body);
    let me = send(&router, RequestSpec::new("GET", "/auth/me").bearer(&token)).await;
    assert_eq!(me.status, StatusCode::OK);

    // The presented value was consumed by the rotation.
    let replay = send(
        &router,
        RequestSpec::new("POST", "/auth/refresh").cookie(&cookie),
    )
    .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);

    // The rotated-in value still works.
    let again = send(
        &router,
        RequestSpec::new("POST", "/auth/refresh").cookie(&new_cookie),
    )
    .await;
    assert_eq!(again.status, StatusCode::OK);
}

#[tokio::test]
async fn refresh_without_a_cookie_is_unauthorized() {
    let ctx = TestContext::new().await;
    let router = ctx.router();

    let response = send(&router, RequestSpec::new("POST", "/auth/refresh")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let bogus = send(
        &router,
        RequestSpec::new("POST", "/auth/refresh").cookie("refreshToken=never-issued"),
    )
    .await;
    assert_eq!(bogus.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_session_and_clears_the_cookie() {
    let ctx = TestContext::new().await;
    testing::insert_user(&ctx.db, "s@x.com", "Secret1!").await;
    let router = ctx.router();
    let (_, cookie) = login(&router).await;

    let logout = send(
        &router,
        RequestSpec::new("POST", "/auth/logout").cookie(&cookie),
    )
    .await;
    assert_eq!(logout.status, StatusCode::OK);
    let cleared = logout.headers["set-cookie"].to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let replay = send(
        &router,
        RequestSpec::new("POST", "/auth/refresh").cookie(&cookie),
    )
    .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);

    // Logout without a cookie, or with a dead one, still succeeds.
    let blind = send(&router, RequestSpec::new("POST", "/auth/logout")).await;
    assert_eq!(blind.status, StatusCode::OK);
    let repeat = send(
        &router,
        RequestSpec::new("POST", "/auth/logout").cookie(&cookie),
    )
    .await;
    assert_eq!(repeat.status, StatusCode::OK);
}

#[tokio::test]
async fn expired_refresh_token_is_rejected_over_http() {
    use chrono::{Duration, Utc};

    let ctx = TestContext::new().await;
    let user = testing::insert_user(&ctx.db, "s@x.com", "Secret1!").await;
    let router = ctx.router();

    let expired = (Utc::now() - Duration::minutes(5)).naive_utc();
    RefreshTokenStore::create(&ctx.db, user.id, "stale-value", expired)
        .await
        .unwrap();

    let response = send(
        &router,
        RequestSpec::new("POST", "/auth/refresh").cookie("refreshToken=stale-value"),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sessions_are_independent_across_logins() {
    let ctx = TestContext::new().await;
    testing::insert_user(&ctx.db, "s@x.com", "Secret1!").await;
    let router = ctx.router();

    let (_, first) = login(&router).await;
    let (_, second) = login(&router).await;
    assert_ne!(first, second);

    // Logging out the first session leaves the second usable.
    send(
        &router,
        RequestSpec::new("POST", "/auth/logout").cookie(&first),
    )
    .await;
    let refresh = send(
        &router,
        RequestSpec::new("POST", "/auth/refresh").cookie(&second),
    )
    .await;
    assert_eq!(refresh.status, StatusCode::OK);
}
