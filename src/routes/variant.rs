use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::response::ApiResponse;
use crate::dto::variant_dto::CreateVariantRequest;
use crate::error::Result;
use crate::models::user::User;
use crate::AppState;

pub async fn add(
    State(state): State<AppState>,
    Json(req): Json<CreateVariantRequest>,
) -> Result<Response> {
    req.validate()?;

    state.variant_service.add(&req.name).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::<()>::success(
            StatusCode::CREATED.as_u16(),
            "Variant successfully created",
            None,
        )),
    )
        .into_response())
}

pub async fn list(State(state): State<AppState>) -> Result<Response> {
    let variants = state.variant_service.list().await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            StatusCode::OK.as_u16(),
            "all variants",
            Some(variants),
        )),
    )
        .into_response())
}

pub async fn remove(
    State(state): State<AppState>,
    Path((_user_id, variant_name)): Path<(Uuid, String)>,
) -> Result<Response> {
    state.variant_service.remove(&variant_name).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::<()>::success(
            StatusCode::OK.as_u16(),
            "Variant successfully removed",
            None,
        )),
    )
        .into_response())
}

pub async fn get(
    State(state): State<AppState>,
    Path((_user_id, variant_name)): Path<(Uuid, String)>,
) -> Result<Response> {
    let variant = state.variant_service.get(&variant_name).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            StatusCode::OK.as_u16(),
            "variant",
            Some(variant),
        )),
    )
        .into_response())
}

pub async fn start(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((_user_id, variant_name)): Path<(Uuid, String)>,
) -> Result<Response> {
    let variant = state.variant_service.find_by_name(&variant_name).await?;

    state.variant_service.start(variant.id, user.id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            StatusCode::OK.as_u16(),
            "variant successfully started",
            Some(variant),
        )),
    )
        .into_response())
}

pub async fn results(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((_user_id, variant_name)): Path<(Uuid, String)>,
) -> Result<Response> {
    let variant = state.variant_service.find_by_name(&variant_name).await?;

    let testing = state.variant_service.results(variant.id, user.id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            StatusCode::OK.as_u16(),
            "results",
            Some(testing),
        )),
    )
        .into_response())
}
