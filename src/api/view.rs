/// On-the-fly transformed view endpoint
use crate::{
    context::AppContext,
    error::{AppError, AppResult},
    transform::{pipeline, TransformParams},
};
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use std::collections::HashMap;

/// Build view routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/api/view/:image_id", get(view_image))
}

/// Fetch the original, run the transformation pipeline, and serve the
/// encoded result with its resolved Content-Type
async fn view_image(
    State(ctx): State<AppContext>,
    Path(image_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<Response> {
    let original = ctx
        .storage
        .read(&image_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Image '{}' not found in storage", image_id)))?;

    let params = TransformParams::from_query(&query);
    let max_pixels = ctx.config.service.max_pixels;

    // Decode, transform, and encode are CPU-bound; keep them off the
    // async runtime's worker threads
    let (bytes, mime_type) = tokio::task::spawn_blocking(move || {
        pipeline::transform(&original, &params, max_pixels)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Transform task failed: {}", e)))??;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_type)
        .header(header::CONTENT_LENGTH, bytes.len().to_string())
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))
}
