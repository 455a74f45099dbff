mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn author_creation_requires_login() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/authors", server.base_url))
        .json(&json!({ "name": "Tolkien" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(common::error_code(res).await?, "UNAUTHENTICATED");
    Ok(())
}

#[tokio::test]
async fn author_creation_requires_admin() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::login(server, "reader-1", "reader1@example.com").await?;

    let res = client
        .post(format!("{}/api/authors", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Tolkien" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(common::error_code(res).await?, "PERMISSION_DENIED");
    Ok(())
}

#[tokio::test]
async fn duplicate_author_name_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::admin_token(server).await?;

    let res = client
        .post(format!("{}/api/authors", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Tolkien" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["data"]["id"].is_string());

    // Strictly-sequential second create with the same name
    let res = client
        .post(format!("{}/api/authors", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Tolkien" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(common::error_code(res).await?, "ALREADY_EXISTS");

    // A different name still goes through
    let res = client
        .post(format!("{}/api/authors", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Herbert" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn malformed_payloads_are_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::admin_token(server).await?;

    for bad in [
        json!({}),
        json!({ "name": "Tolkien", "era": "20th century" }),
        json!({ "fullName": "Tolkien" }),
        json!({ "name": 42 }),
    ] {
        let res = client
            .post(format!("{}/api/authors", server.base_url))
            .bearer_auth(&token)
            .json(&bad)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "payload: {}", bad);
        assert_eq!(common::error_code(res).await?, "INVALID_ARGUMENT");
    }
    Ok(())
}
