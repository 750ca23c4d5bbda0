/// Original-image upload endpoint
use crate::{
    context::AppContext,
    error::{AppError, AppResult},
};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Serialize;

/// Build upload routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/api/upload", post(upload_image))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub image_id: String,
    pub message: String,
}

/// Accept a multipart upload with a `file` field, store the original
/// unmodified, and return its generated identifier
async fn upload_image(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(AppError::Validation("No selected file".to_string()));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?
            .to_vec();
        if data.len() > ctx.config.service.upload_limit {
            return Err(AppError::Validation(format!(
                "Upload exceeds the {} byte limit",
                ctx.config.service.upload_limit
            )));
        }

        let image_id = ctx.originals.store(data, &filename).await?;

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                success: true,
                image_id,
                message: "Image uploaded successfully.".to_string(),
            }),
        ));
    }

    Err(AppError::Validation("No file part".to_string()))
}
