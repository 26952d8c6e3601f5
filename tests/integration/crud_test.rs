use super::common;

use common::test_server::TestServer;
use serde_json::{json, Value};
use std::collections::BTreeSet;

async fn check_crud_round(server: &TestServer) {
    let client = reqwest::Client::new();

    let list: Value = client
        .get(server.url("/api/users"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.as_array().unwrap().len(), 3);

    let response = client
        .post(server.url("/api/users"))
        .json(&json!({ "name": "dana", "age": 30 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["id"], 4);

    let response = client.get(server.url("/api/users/4")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    let user: Value = response.json().await.unwrap();
    assert_eq!(user, json!({ "age": 30, "name": "dana" }));

    let response = client
        .put(server.url("/api/users/20"))
        .json(&json!({ "name": "twenty" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = client
        .delete(server.url("/api/users/2"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let list: Value = client
        .get(server.url("/api/users"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<i64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3, 4, 20]);

    // Next id continues from the current maximum
    let created: Value = client
        .post(server.url("/api/users"))
        .json(&json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["id"], 21);
}

#[tokio::test]
async fn test_crud_round_in_memory() {
    let server = TestServer::new().await;
    check_crud_round(&server).await;
}

#[tokio::test]
async fn test_crud_round_sqlite() {
    let server = TestServer::sqlite().await;
    check_crud_round(&server).await;
}

#[tokio::test]
async fn test_get_only_endpoint() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let response = client.get(server.url("/api/products/1")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let product: Value = response.json().await.unwrap();
    let price: f64 = product["price"].as_str().unwrap().parse().unwrap();
    assert!((0.0..=1000.0).contains(&price));

    let response = client
        .post(server.url("/api/products"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 405);

    let response = client.get(server.url("/api/products/3")).send().await.unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "The ID 3 is over the maximum number of entries (maxCount: 2) for endpoint: products"
    );
}

#[tokio::test]
async fn test_invalid_body_is_rejected() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/api/users"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_posts_get_unique_ids() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let handles: Vec<_> = (0..40)
        .map(|i| {
            let client = client.clone();
            let url = server.url("/api/users");
            tokio::spawn(async move {
                let created: Value = client
                    .post(url)
                    .json(&json!({ "n": i }))
                    .send()
                    .await
                    .unwrap()
                    .json()
                    .await
                    .unwrap();
                created["id"].as_i64().unwrap()
            })
        })
        .collect();

    let mut ids = BTreeSet::new();
    for handle in handles {
        assert!(ids.insert(handle.await.unwrap()));
    }
    assert_eq!(ids, (4..=43).collect::<BTreeSet<i64>>());
}
