use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, RegisterRequest};
use crate::dto::response::ApiResponse;
use crate::error::Result;
use crate::models::user::User;
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response> {
    req.validate()?;

    let user = state
        .register_service
        .register(&req.login, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            StatusCode::CREATED.as_u16(),
            "User successfully created",
            Some(user),
        )),
    )
        .into_response())
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response> {
    req.validate()?;

    // Wrong login and wrong password are indistinguishable here; both
    // answer 401 with the same message.
    let user = match state.register_service.login(&req.login, &req.password).await {
        Ok(user) => user,
        Err(err @ crate::error::Error::UserNotFound) => {
            return Ok((
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<()>::error(
                    StatusCode::UNAUTHORIZED.as_u16(),
                    err.to_string(),
                )),
            )
                .into_response())
        }
        Err(err) => return Err(err),
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            StatusCode::CREATED.as_u16(),
            "User successfully login",
            Some(user),
        )),
    )
        .into_response())
}

pub async fn quit(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Response> {
    state.user_service.quit(user.uuid).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::<()>::success(
            StatusCode::OK.as_u16(),
            "Quit successfully",
            None,
        )),
    )
        .into_response())
}
