use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::question_dto::{AcceptAnswerRequest, CreateQuestionRequest, RemoveQuestionRequest};
use crate::dto::response::ApiResponse;
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::AppState;

pub async fn add(
    State(state): State<AppState>,
    Path((_user_id, variant_name)): Path<(Uuid, String)>,
    Json(req): Json<CreateQuestionRequest>,
) -> Result<Response> {
    req.validate()?;

    let variant = state.variant_service.find_by_name(&variant_name).await?;
    state.question_service.add(variant.id, &req).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::<()>::success(
            StatusCode::OK.as_u16(),
            "Question added successfully",
            None,
        )),
    )
        .into_response())
}

pub async fn remove(
    State(state): State<AppState>,
    Path((_user_id, variant_name)): Path<(Uuid, String)>,
    Json(req): Json<RemoveQuestionRequest>,
) -> Result<Response> {
    req.validate()?;

    let variant = state.variant_service.find_by_name(&variant_name).await?;
    state
        .question_service
        .remove(variant.id, &req.question)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::<()>::success(
            StatusCode::OK.as_u16(),
            "Question removed successfully",
            None,
        )),
    )
        .into_response())
}

pub async fn get(
    State(state): State<AppState>,
    Path((_user_id, variant_name, question_id)): Path<(Uuid, String, i64)>,
) -> Result<Response> {
    require_positive(question_id)?;

    let variant = state.variant_service.find_by_name(&variant_name).await?;
    let question = state.question_service.get(variant.id, question_id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            StatusCode::OK.as_u16(),
            "question",
            Some(question),
        )),
    )
        .into_response())
}

pub async fn accept(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((_user_id, variant_name, question_id)): Path<(Uuid, String, i64)>,
    Json(req): Json<AcceptAnswerRequest>,
) -> Result<Response> {
    req.validate()?;
    require_positive(question_id)?;

    let variant = state.variant_service.find_by_name(&variant_name).await?;
    state
        .question_service
        .accept(variant.id, question_id, user.id, &req.answer)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::<()>::success(
            StatusCode::OK.as_u16(),
            "answer accepted",
            None,
        )),
    )
        .into_response())
}

fn require_positive(question_id: i64) -> Result<()> {
    if question_id <= 0 {
        return Err(Error::BadRequest(
            "Question id must be a positive integer".to_string(),
        ));
    }
    Ok(())
}
