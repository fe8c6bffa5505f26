use axum::{response::Json, http::StatusCode};

use crate::dto::response::ApiResponse;

pub async fn health() -> Json<ApiResponse<()>> {
    Json(ApiResponse::success(StatusCode::OK.as_u16(), "ok", None))
}
