mod common;

use common::{unique_user_id, TestApp};

#[tokio::test]
async fn create_user_returns_201_with_the_new_record() {
    let app = TestApp::spawn().await;
    let user_id = unique_user_id();

    let response = app.create_user(&user_id).await;

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["userId"], user_id.as_str());
    assert_eq!(body["firstName"], "Jane");
    assert_eq!(body["lastName"], "Filer");
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn creating_the_same_user_twice_returns_400() {
    let app = TestApp::spawn().await;
    let user_id = unique_user_id();

    assert_eq!(app.create_user(&user_id).await.status(), 201);

    let response = app.create_user(&user_id).await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn create_user_rejects_blank_fields() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/user", app.address))
        .json(&serde_json::json!({
            "userId": "",
            "firstName": "Jane",
            "lastName": "Filer"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn get_user_returns_the_record_or_404() {
    let app = TestApp::spawn().await;
    let user_id = unique_user_id();
    app.create_user(&user_id).await;

    let response = app
        .client
        .get(format!("{}/user/{}", app.address, user_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["userId"], user_id.as_str());

    let response = app
        .client
        .get(format!("{}/user/{}", app.address, unique_user_id()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn list_users_orders_most_recently_created_first() {
    let app = TestApp::spawn().await;
    let older = unique_user_id();
    let newer = unique_user_id();

    app.create_user(&older).await;
    app.create_user(&newer).await;

    let response = app
        .client
        .get(format!("{}/user", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    let users = body["users"].as_array().unwrap();
    assert_eq!(body["totalUsers"].as_u64().unwrap() as usize, users.len());

    let position = |id: &str| {
        users
            .iter()
            .position(|u| u["userId"] == id)
            .unwrap_or_else(|| panic!("user {} missing from listing", id))
    };
    assert!(position(&newer) < position(&older));
}
