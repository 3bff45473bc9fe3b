use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes;
use service::file::codeblocks::CodeBlockStore;

fn cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    // Isolated data file per test run
    let temp_id = Uuid::new_v4();
    let data_file = format!("target/test-data/{}/codeblocks.json", temp_id);
    let store = CodeBlockStore::new(&data_file).await?;

    let app: Router = routes::build_router(Arc::clone(&store), cors());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url })
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

#[tokio::test]
async fn e2e_root_and_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.get(&app.base_url).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "CodeBlocks API is running");

    let res = c.get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_codeblocks_crud_flow() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    // Create first block; id 1, lineExplanations defaults to {}
    let res = c
        .post(format!("{}/codeblocks", app.base_url))
        .json(&json!({
            "title": "Loop",
            "category": "Basics",
            "code": "for x in y:",
            "explanation": "iterates"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let first = res.json::<serde_json::Value>().await?;
    assert_eq!(first["id"], 1);
    assert_eq!(first["title"], "Loop");
    assert_eq!(first["lineExplanations"], json!({}));

    // Second create gets id 2 and may carry line notes
    let res = c
        .post(format!("{}/codeblocks", app.base_url))
        .json(&json!({
            "title": "Map",
            "category": "Basics",
            "code": "map(f, xs)",
            "explanation": "applies f",
            "lineExplanations": {"1": "the call"}
        }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let second = res.json::<serde_json::Value>().await?;
    assert_eq!(second["id"], 2);
    assert_eq!(second["lineExplanations"]["1"], "the call");

    // List preserves creation order
    let res = c.get(format!("{}/codeblocks", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let all = res.json::<Vec<serde_json::Value>>().await?;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["id"], 1);
    assert_eq!(all[1]["id"], 2);

    // Get by id
    let res = c.get(format!("{}/codeblocks/1", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let one = res.json::<serde_json::Value>().await?;
    assert_eq!(one["title"], "Loop");

    // Partial update touches only the supplied field
    let res = c
        .put(format!("{}/codeblocks/1", app.base_url))
        .json(&json!({"explanation": "iterates over y"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let updated = res.json::<serde_json::Value>().await?;
    assert_eq!(updated["explanation"], "iterates over y");
    assert_eq!(updated["title"], "Loop");
    assert_eq!(updated["category"], "Basics");
    assert_eq!(updated["code"], "for x in y:");

    // Categories are deduplicated
    let res = c.get(format!("{}/categories", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["categories"], json!(["Basics"]));

    // Delete returns a confirmation envelope with the removed record
    let res = c.delete(format!("{}/codeblocks/2", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Code block deleted");
    assert_eq!(body["block"]["id"], 2);
    assert_eq!(body["block"]["title"], "Map");

    // The deleted block is gone
    let res = c.get(format!("{}/codeblocks/2", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_missing_id_yields_fixed_404_body() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.get(format!("{}/codeblocks/99", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["detail"], "Code block not found");

    let res = c
        .put(format!("{}/codeblocks/99", app.base_url))
        .json(&json!({"title": "nope"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["detail"], "Code block not found");

    let res = c.delete(format!("{}/codeblocks/99", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["detail"], "Code block not found");
    Ok(())
}

#[tokio::test]
async fn e2e_create_missing_required_field_rejected() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    // No code/explanation: rejected by body deserialization before the handler
    let res = c
        .post(format!("{}/codeblocks", app.base_url))
        .json(&json!({"title": "incomplete", "category": "Basics"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);

    // Nothing was persisted
    let res = c.get(format!("{}/codeblocks", app.base_url)).send().await?;
    let all = res.json::<Vec<serde_json::Value>>().await?;
    assert!(all.is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_cors_preflight_allows_any_origin() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c
        .request(reqwest::Method::OPTIONS, format!("{}/codeblocks", app.base_url))
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await?;
    assert!(res.status().is_success());
    assert!(res.headers().get("access-control-allow-origin").is_some());
    Ok(())
}
