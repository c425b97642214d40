mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{json_body, pen, TestServer};

#[tokio::test]
async fn create_then_get_returns_identical_fields() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (token, _) = server.register("a@x.com", "Abc12345!", "Ann").await?;

    let res = server.post("/products").bearer_auth(&token).json(&pen()).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = json_body(res).await?["data"].clone();

    assert_eq!(created["name"], "Pen");
    assert_eq!(created["price"], 1.5);
    assert_eq!(created["stock"], 10);
    assert_eq!(created["createdAt"], created["updatedAt"]);
    let id = created["id"].as_str().unwrap_or_default().to_string();
    assert!(!id.is_empty());

    // Reads are public
    let res = server.get(&format!("/products/{}", id)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await?["data"], created);
    Ok(())
}

#[tokio::test]
async fn update_stock_leaves_price_and_advances_updated_at() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (token, _) = server.register("a@x.com", "Abc12345!", "Ann").await?;

    let created = json_body(server.post("/products").bearer_auth(&token).json(&pen()).send().await?).await?;
    let id = created["data"]["id"].as_str().unwrap_or_default().to_string();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let res = server
        .put(&format!("/products/{}", id))
        .bearer_auth(&token)
        .json(&json!({ "stock": 5 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let updated = json_body(res).await?["data"].clone();
    assert_eq!(updated["stock"], 5);
    assert_eq!(updated["price"], 1.5);
    assert_eq!(updated["id"], id.as_str());
    assert_ne!(updated["updatedAt"], created["data"]["updatedAt"]);
    assert_eq!(updated["createdAt"], created["data"]["createdAt"]);
    Ok(())
}

#[tokio::test]
async fn update_cannot_touch_key_fields() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (token, _) = server.register("a@x.com", "Abc12345!", "Ann").await?;

    let created = json_body(server.post("/products").bearer_auth(&token).json(&pen()).send().await?).await?;
    let id = created["data"]["id"].as_str().unwrap_or_default().to_string();

    for body in [json!({ "id": "hijacked", "stock": 1 }), json!({ "type": "order" })] {
        let res = server
            .put(&format!("/products/{}", id))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await?["code"], "VALIDATION_ERROR");
    }

    let res = server.get(&format!("/products/{}", id)).send().await?;
    assert_eq!(json_body(res).await?["data"]["stock"], 10);
    assert_eq!(server.get("/products/hijacked").send().await?.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn mutations_require_a_token() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.post("/products").json(&pen()).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.put("/products/any").json(&json!({ "stock": 1 })).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.delete("/products/any").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn invalid_product_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (token, _) = server.register("a@x.com", "Abc12345!", "Ann").await?;

    let res = server
        .post("/products")
        .bearer_auth(&token)
        .json(&json!({ "name": "Pen", "price": 0, "category": "office", "stock": -1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = json_body(res).await?;
    assert!(body["field_errors"]["price"].is_string());
    assert!(body["field_errors"]["stock"].is_string());
    Ok(())
}

#[tokio::test]
async fn delete_twice_acks_then_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (token, _) = server.register("a@x.com", "Abc12345!", "Ann").await?;

    let created = json_body(server.post("/products").bearer_auth(&token).json(&pen()).send().await?).await?;
    let path = format!("/products/{}", created["data"]["id"].as_str().unwrap_or_default());

    let res = server.delete(&path).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await?["data"]["deleted"], true);

    let res = server.delete(&path).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(res).await?["error"], "Product not found");

    assert_eq!(server.get(&path).send().await?.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn list_is_a_single_unpaginated_page() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (token, _) = server.register("a@x.com", "Abc12345!", "Ann").await?;

    for _ in 0..25 {
        let res = server.post("/products").bearer_auth(&token).json(&pen()).send().await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = server.get("/products").send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(25));
    Ok(())
}
