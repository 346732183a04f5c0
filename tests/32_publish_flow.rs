mod common;

use anyhow::Result;
use bookbinder_api::access::Role;
use reqwest::StatusCode;
use serde_json::json;

/// Full publish flow: superadmin creates a subject and assigns an author;
/// the author builds a book with a topic, a chapter, and a page; the public
/// viewer endpoint returns the page content verbatim.
#[tokio::test]
async fn subject_to_public_page() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let suffix = common::unique_suffix();

    let admin = common::seed_user(Role::Superadmin, &format!("adm{}", suffix)).await?;
    let author = common::seed_user(Role::Author, &format!("aut{}", suffix)).await?;

    // Superadmin session
    let admin_client = common::client();
    let body = common::login(&admin_client, &server.base_url, &admin.email, &admin.password).await?;
    assert_eq!(body["redirectUrl"], "/dashboard");

    // Create the subject
    let res = admin_client
        .post(format!("{}/subjects", server.base_url))
        .json(&json!({ "name": format!("Biology {}", suffix), "description": "Life sciences" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let subject = res.json::<serde_json::Value>().await?["subject"].clone();
    let subject_id = subject["id"].as_str().unwrap().to_string();

    // Assign the author to it
    let res = admin_client
        .post(format!("{}/mappings/author-subjects", server.base_url))
        .json(&json!({ "author_id": author.id, "subject_id": subject_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Author session
    let author_client = common::client();
    let body =
        common::login(&author_client, &server.base_url, &author.email, &author.password).await?;
    assert_eq!(body["redirectUrl"], "/author");

    // The assigned subject is visible to the author
    let res = author_client
        .get(format!("{}/author/subjects", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let subjects = res.json::<serde_json::Value>().await?["subjects"].clone();
    assert!(subjects
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["id"].as_str() == Some(subject_id.as_str())));

    // Book plus its initial topic in one request
    let res = author_client
        .post(format!("{}/author/books", server.base_url))
        .json(&json!({
            "title": "Cell Structure",
            "subject_id": subject_id,
            "topics": ["Cell Basics"],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let book = res.json::<serde_json::Value>().await?["book"].clone();
    let book_id = book["id"].as_str().unwrap().to_string();

    // Chapter
    let res = author_client
        .post(format!("{}/author/chapters", server.base_url))
        .json(&json!({ "book_id": book_id, "title": "Intro", "order_num": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let chapter = res.json::<serde_json::Value>().await?["chapter"].clone();
    let chapter_id = chapter["id"].as_str().unwrap().to_string();

    // Page with HTML content
    let content = "<h1>Intro</h1><p>The cell is the basic unit of life.</p>";
    let res = author_client
        .post(format!("{}/author/pages", server.base_url))
        .json(&json!({ "chapter_id": chapter_id, "content": content, "order_num": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Anonymous read returns the content verbatim
    let public_client = reqwest::Client::new();
    let res = public_client
        .get(format!(
            "{}/books/{}/chapters/{}/pages",
            server.base_url, book_id, chapter_id
        ))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let pages = res.json::<serde_json::Value>().await?["pages"].clone();
    assert_eq!(pages.as_array().unwrap().len(), 1);
    assert_eq!(pages[0]["content"], content);

    // The book shows up in the public catalogue and the admin listing
    let res = public_client
        .get(format!("{}/books/{}", server.base_url, book_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let detail = res.json::<serde_json::Value>().await?;
    assert_eq!(detail["book"]["title"], "Cell Structure");

    let res = admin_client
        .get(format!("{}/admin/books", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let books = res.json::<serde_json::Value>().await?["books"].clone();
    assert!(books
        .as_array()
        .unwrap()
        .iter()
        .any(|b| b["id"].as_str() == Some(book_id.as_str())));

    Ok(())
}

/// Deleting a book removes every chapter, subtopic, and page beneath it.
#[tokio::test]
async fn book_deletion_cascades() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let suffix = common::unique_suffix();

    let admin = common::seed_user(Role::Superadmin, &format!("cadm{}", suffix)).await?;
    let author = common::seed_user(Role::Author, &format!("caut{}", suffix)).await?;

    let admin_client = common::client();
    common::login(&admin_client, &server.base_url, &admin.email, &admin.password).await?;

    let res = admin_client
        .post(format!("{}/subjects", server.base_url))
        .json(&json!({ "name": format!("Chemistry {}", suffix) }))
        .send()
        .await?;
    let subject_id = res.json::<serde_json::Value>().await?["subject"]["id"]
        .as_str()
        .unwrap()
        .to_string();
    admin_client
        .post(format!("{}/mappings/author-subjects", server.base_url))
        .json(&json!({ "author_id": author.id, "subject_id": subject_id }))
        .send()
        .await?;

    let author_client = common::client();
    common::login(&author_client, &server.base_url, &author.email, &author.password).await?;

    let res = author_client
        .post(format!("{}/author/books", server.base_url))
        .json(&json!({ "title": "Organic Basics", "subject_id": subject_id }))
        .send()
        .await?;
    let book_id = res.json::<serde_json::Value>().await?["book"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = author_client
        .post(format!("{}/author/chapters", server.base_url))
        .json(&json!({ "book_id": book_id, "title": "Alkanes", "order_num": 1 }))
        .send()
        .await?;
    let chapter_id = res.json::<serde_json::Value>().await?["chapter"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    author_client
        .post(format!("{}/author/pages", server.base_url))
        .json(&json!({ "chapter_id": chapter_id, "content": "<p>CH4</p>" }))
        .send()
        .await?;

    let res = author_client
        .delete(format!("{}/author/books?id={}", server.base_url, book_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Book and everything beneath it are gone from the public surface
    let public_client = reqwest::Client::new();
    let res = public_client
        .get(format!("{}/books/{}", server.base_url, book_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = public_client
        .get(format!(
            "{}/books/{}/chapters/{}/pages",
            server.base_url, book_id, chapter_id
        ))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}
