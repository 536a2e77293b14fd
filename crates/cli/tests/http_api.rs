use flora_cli::router;
use flora_dataset::{DatasetHandle, LoadOptions};
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

const TRAITS_CSV: &str = "\
species_name,flower_colour
Telopea speciosissima,red
Acacia terminalis,yellow
";

async fn spawn_server(dataset: Arc<DatasetHandle>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(dataset)).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn command_endpoint_shares_one_table() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("traits.csv");
    fs::write(&path, TRAITS_CSV).unwrap();
    let dataset = Arc::new(DatasetHandle::new(LoadOptions::new(&path)));
    let base = spawn_server(dataset.clone()).await;
    let client = reqwest::Client::new();

    let health: Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["loaded"], false);

    let response = client
        .post(format!("{base}/command"))
        .header("content-type", "application/json")
        .body(json!({"action": "compare", "payload": {"species": ["Acacia terminalis"]}}).to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data"]["rows"][0]["species"], "Acacia terminalis");
    assert_eq!(body["data"]["rows"][0]["values"], json!(["yellow"]));

    let health: Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["loaded"], true);
    assert_eq!(health["rows"], 2);
    assert!(dataset.is_loaded());
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("traits.csv");
    fs::write(&path, TRAITS_CSV).unwrap();
    let base = spawn_server(Arc::new(DatasetHandle::new(LoadOptions::new(&path)))).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/command"))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["code"], "invalid_request");
}
