mod common;

use anyhow::Result;
use bookbinder_api::access::Role;
use reqwest::{redirect, StatusCode};

fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .cookie_store(true)
        .build()
        .expect("failed to build http client")
}

/// Anonymous browser navigation to a guarded prefix bounces to /login.
#[tokio::test]
async fn anonymous_dashboard_redirects_to_login() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };

    let client = no_redirect_client();
    let res = client
        .get(format!("{}/dashboard", server.base_url))
        .header("accept", "text/html")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        res.headers().get("location").and_then(|v| v.to_str().ok()),
        Some("/login")
    );
    Ok(())
}

/// An authenticated author landing on /login is sent to the author home.
#[tokio::test]
async fn login_page_bounces_authenticated_users() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let suffix = common::unique_suffix();

    let author = common::seed_user(Role::Author, &format!("gaut{}", suffix)).await?;
    let client = no_redirect_client();
    common::login(&client, &server.base_url, &author.email, &author.password).await?;

    let res = client
        .get(format!("{}/login", server.base_url))
        .header("accept", "text/html")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        res.headers().get("location").and_then(|v| v.to_str().ok()),
        Some("/author")
    );
    Ok(())
}

/// JSON API requests under /author are never redirected; they get status
/// codes from the handlers instead.
#[tokio::test]
async fn api_requests_are_not_redirected() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };

    let client = no_redirect_client();
    let res = client
        .get(format!("{}/author/books", server.base_url))
        .header("accept", "application/json")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
