mod common;

use anyhow::Result;
use bookbinder_api::access::Role;
use reqwest::StatusCode;
use serde_json::json;

/// Admin provisions an author together with a subject assignment; both show
/// up in the listings. The generated credential travels by mail, not in the
/// response body.
#[tokio::test]
async fn provision_author_with_assignment() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let suffix = common::unique_suffix();

    let admin = common::seed_user(Role::Superadmin, &format!("padm{}", suffix)).await?;
    let admin_client = common::client();
    common::login(&admin_client, &server.base_url, &admin.email, &admin.password).await?;

    let res = admin_client
        .post(format!("{}/subjects", server.base_url))
        .json(&json!({ "name": format!("Geography {}", suffix) }))
        .send()
        .await?;
    let subject_id = res.json::<serde_json::Value>().await?["subject"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let username = format!("paut{}", suffix);
    let res = admin_client
        .post(format!("{}/authors", server.base_url))
        .json(&json!({
            "username": username,
            "email": format!("{}@test.invalid", username),
            "subject_ids": [subject_id],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    let author_id = body["author"]["id"].as_str().unwrap().to_string();
    // Mail delivery worked, so no credential in the response
    assert!(body.get("tempPassword").is_none());

    let res = admin_client
        .get(format!("{}/authors", server.base_url))
        .send()
        .await?;
    let authors = res.json::<serde_json::Value>().await?["authors"].clone();
    assert!(authors
        .as_array()
        .unwrap()
        .iter()
        .any(|a| a["id"].as_str() == Some(author_id.as_str())));

    let res = admin_client
        .get(format!("{}/mappings/author-subjects", server.base_url))
        .send()
        .await?;
    let mappings = res.json::<serde_json::Value>().await?["mappings"].clone();
    assert!(mappings
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m["author_id"].as_str() == Some(author_id.as_str())));

    Ok(())
}

/// Provisioning against an unknown subject rolls the whole thing back.
#[tokio::test]
async fn provisioning_rolls_back_on_bad_assignment() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let suffix = common::unique_suffix();

    let admin = common::seed_user(Role::Superadmin, &format!("radm{}", suffix)).await?;
    let admin_client = common::client();
    common::login(&admin_client, &server.base_url, &admin.email, &admin.password).await?;

    let username = format!("raut{}", suffix);
    let res = admin_client
        .post(format!("{}/authors", server.base_url))
        .json(&json!({
            "username": username,
            "email": format!("{}@test.invalid", username),
            "subject_ids": [uuid::Uuid::new_v4()],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The author row was not left behind
    let res = admin_client
        .get(format!("{}/authors", server.base_url))
        .send()
        .await?;
    let authors = res.json::<serde_json::Value>().await?["authors"].clone();
    assert!(!authors
        .as_array()
        .unwrap()
        .iter()
        .any(|a| a["username"].as_str() == Some(username.as_str())));

    Ok(())
}

/// Malformed input never reaches the store.
#[tokio::test]
async fn provisioning_validates_input() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let suffix = common::unique_suffix();

    let admin = common::seed_user(Role::Superadmin, &format!("vadm{}", suffix)).await?;
    let admin_client = common::client();
    common::login(&admin_client, &server.base_url, &admin.email, &admin.password).await?;

    let res = admin_client
        .post(format!("{}/authors", server.base_url))
        .json(&json!({ "username": "ok_name", "email": "not-an-email" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = admin_client
        .post(format!("{}/authors", server.base_url))
        .json(&json!({ "username": "ab", "email": format!("v{}@test.invalid", suffix) }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
