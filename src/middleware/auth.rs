use std::collections::HashMap;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;

use crate::dto::response::ApiResponse;
use crate::AppState;

/// Gate for everything under `/:user_id`: the id must parse as a UUID
/// (400, before any storage call), and the user must be authorized
/// (401 otherwise). The resolved user lands in request extensions.
pub async fn require_user(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(raw_id) = params.get("user_id") else {
        return bad_request("No id supplied");
    };

    let Ok(external_id) = Uuid::parse_str(raw_id) else {
        return bad_request("Invalid id supplied");
    };

    match state.user_service.authenticated(external_id).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST.as_u16(),
            message,
        )),
    )
        .into_response()
}
