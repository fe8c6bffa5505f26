use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::dto::response::ApiResponse;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("user already exists")]
    UserAlreadyExists,

    #[error("user not found")]
    UserNotFound,

    #[error("user not authorized")]
    UserNotAuthorized,

    #[error("variant already exists")]
    VariantAlreadyExists,

    #[error("variant too long: >16")]
    VariantTooLong,

    #[error("variant not found")]
    VariantNotFound,

    #[error("no variants yet")]
    NoVariantsYet,

    #[error("variant completed")]
    VariantCompleted,

    #[error("question already exists")]
    QuestionAlreadyExists,

    #[error("question not found")]
    QuestionNotFound,

    #[error("question limit exceeded")]
    QuestionLimitExceeded,

    #[error("testing not found")]
    TestNotFound,

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            Error::UserAlreadyExists
            | Error::VariantAlreadyExists
            | Error::QuestionAlreadyExists
            | Error::VariantCompleted => StatusCode::CONFLICT,

            Error::UserNotFound
            | Error::VariantNotFound
            | Error::NoVariantsYet
            | Error::QuestionNotFound
            | Error::TestNotFound => StatusCode::NOT_FOUND,

            Error::UserNotAuthorized => StatusCode::UNAUTHORIZED,

            Error::BadRequest(_)
            | Error::VariantTooLong
            | Error::QuestionLimitExceeded
            | Error::Validation(_) => StatusCode::BAD_REQUEST,

            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ApiResponse::<()>::error(status.as_u16(), self.to_string()));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(err)
    }
}

/// Structural classification of a storage failure, replacing substring
/// matching on the driver's error text.
pub fn db_error_kind(err: &sqlx::Error) -> DbErrorKind {
    match err {
        sqlx::Error::RowNotFound => DbErrorKind::NotFound,
        sqlx::Error::Database(db) => {
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
                DbErrorKind::UniqueViolation
            } else if matches!(db.kind(), sqlx::error::ErrorKind::ForeignKeyViolation) {
                DbErrorKind::ForeignKeyViolation
            } else if db.code().as_deref() == Some("22001") {
                // string_data_right_truncation
                DbErrorKind::ValueTooLong
            } else {
                DbErrorKind::Other
            }
        }
        _ => DbErrorKind::Other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    NotFound,
    UniqueViolation,
    ForeignKeyViolation,
    ValueTooLong,
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: Error) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn conflict_errors_map_to_409() {
        assert_eq!(status_of(Error::UserAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(status_of(Error::VariantAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(
            status_of(Error::QuestionAlreadyExists),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(Error::VariantCompleted), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_errors_map_to_404() {
        assert_eq!(status_of(Error::UserNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(Error::VariantNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(Error::NoVariantsYet), StatusCode::NOT_FOUND);
        assert_eq!(status_of(Error::QuestionNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(Error::TestNotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn limit_and_length_errors_map_to_400() {
        assert_eq!(
            status_of(Error::QuestionLimitExceeded),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(Error::VariantTooLong), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(Error::BadRequest("bad".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn not_authorized_maps_to_401_and_database_to_500() {
        assert_eq!(status_of(Error::UserNotAuthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(Error::Database(sqlx::Error::PoolClosed)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn row_not_found_classifies_as_not_found() {
        assert_eq!(
            db_error_kind(&sqlx::Error::RowNotFound),
            DbErrorKind::NotFound
        );
        assert_eq!(db_error_kind(&sqlx::Error::PoolClosed), DbErrorKind::Other);
    }
}
