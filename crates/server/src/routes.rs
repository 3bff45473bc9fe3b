use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use common::types::Health;
use service::file::codeblocks::{CodeBlock, CodeBlockDraft, CodeBlockPatch, CodeBlockStore};

use crate::errors::ApiError;

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "CodeBlocks API is running" }))
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn list_codeblocks(
    State(store): State<Arc<CodeBlockStore>>,
) -> Result<Json<Vec<CodeBlock>>, ApiError> {
    let blocks = store.list().await?;
    Ok(Json(blocks))
}

async fn get_codeblock(
    State(store): State<Arc<CodeBlockStore>>,
    Path(id): Path<u64>,
) -> Result<Json<CodeBlock>, ApiError> {
    let block = store.get(id).await?;
    Ok(Json(block))
}

async fn create_codeblock(
    State(store): State<Arc<CodeBlockStore>>,
    Json(draft): Json<CodeBlockDraft>,
) -> Result<Json<CodeBlock>, ApiError> {
    let block = store.create(draft).await?;
    info!(id = block.id, title = %block.title, "created code block");
    Ok(Json(block))
}

async fn update_codeblock(
    State(store): State<Arc<CodeBlockStore>>,
    Path(id): Path<u64>,
    Json(patch): Json<CodeBlockPatch>,
) -> Result<Json<CodeBlock>, ApiError> {
    let block = store.update(id, patch).await?;
    info!(id = block.id, "updated code block");
    Ok(Json(block))
}

async fn delete_codeblock(
    State(store): State<Arc<CodeBlockStore>>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let block = store.delete(id).await?;
    info!(id = block.id, title = %block.title, "deleted code block");
    Ok(Json(json!({ "message": "Code block deleted", "block": block })))
}

async fn list_categories(
    State(store): State<Arc<CodeBlockStore>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let categories = store.categories().await?;
    Ok(Json(json!({ "categories": categories })))
}

/// Build the full application router over the given store
pub fn build_router(store: Arc<CodeBlockStore>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/codeblocks", get(list_codeblocks).post(create_codeblock))
        .route(
            "/codeblocks/:id",
            get(get_codeblock).put(update_codeblock).delete(delete_codeblock),
        )
        .route("/categories", get(list_categories))
        .with_state(store)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                ),
        )
}
