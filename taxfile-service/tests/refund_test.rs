mod common;

use common::{unique_user_id, TestApp};

#[tokio::test]
async fn refund_is_queryable_by_user_year_and_by_file_id() {
    let app = TestApp::spawn().await;
    let user_id = unique_user_id();
    app.create_user(&user_id).await;

    let created: serde_json::Value = app
        .create_tax_file(&user_id, 2024, "500")
        .await
        .json()
        .await
        .unwrap();
    let file_id = created["fileId"].as_str().unwrap();

    let response = app
        .client
        .get(format!("{}/refund", app.address))
        .query(&[("userId", user_id.as_str()), ("year", "2024")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["fileId"], file_id);
    assert_eq!(body["userId"], user_id.as_str());
    assert_eq!(body["year"], 2024);
    assert_eq!(body["refundStatus"], "PENDING");
    assert!(body["errors"].as_array().unwrap().is_empty());
    assert!(body["eta"].is_string());

    let response = app.get_refund_by_file_id(file_id).await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["userId"], user_id.as_str());
}

#[tokio::test]
async fn refund_is_absent_for_zero_refund_filings() {
    let app = TestApp::spawn().await;
    let user_id = unique_user_id();
    app.create_user(&user_id).await;
    app.create_tax_file(&user_id, 2024, "0").await;

    let response = app
        .client
        .get(format!("{}/refund", app.address))
        .query(&[("userId", user_id.as_str()), ("year", "2024")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn refund_query_requires_a_key() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/refund", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // year alone is not a usable key either
    let response = app
        .client
        .get(format!("{}/refund", app.address))
        .query(&[("year", "2024")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn refund_query_rejects_malformed_file_ids() {
    let app = TestApp::spawn().await;

    let response = app.get_refund_by_file_id("not-a-uuid").await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn refund_query_returns_404_for_unknown_file_ids() {
    let app = TestApp::spawn().await;

    let response = app
        .get_refund_by_file_id(&uuid::Uuid::new_v4().to_string())
        .await;
    assert_eq!(response.status(), 404);
}
