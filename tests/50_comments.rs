mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn commenting_requires_login() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/comments", server.base_url))
        .json(&json!({ "bookId": "b1", "text": "Great read" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(common::error_code(res).await?, "UNAUTHENTICATED");
    Ok(())
}

#[tokio::test]
async fn commenting_without_profile_is_a_failed_precondition() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::login(server, "lurker-1", "lurker1@example.com").await?;

    let res = client
        .post(format!("{}/api/comments", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "bookId": "b1", "text": "First!" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(common::error_code(res).await?, "FAILED_PRECONDITION");
    Ok(())
}

#[tokio::test]
async fn comment_username_comes_from_the_callers_profile() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::login(server, "user-bob", "bob@example.com").await?;

    let res = client
        .post(format!("{}/api/profiles", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "username": "bob" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/api/comments", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "bookId": "b1", "text": "Loved the ending." }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["username"], "bob");
    Ok(())
}

#[tokio::test]
async fn payload_may_not_supply_a_username() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::login(server, "user-carol", "carol@example.com").await?;

    let res = client
        .post(format!("{}/api/profiles", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "username": "carol" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // The exact-key-set rule rejects a client-supplied username outright
    let res = client
        .post(format!("{}/api/comments", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "bookId": "b1", "text": "hi", "username": "admin" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::error_code(res).await?, "INVALID_ARGUMENT");
    Ok(())
}
