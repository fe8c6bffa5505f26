use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{db_error_kind, DbErrorKind, Error, Result};
use crate::models::user::User;
use crate::utils::crypto::hash_password;

#[derive(Clone)]
pub struct RegisterService {
    pool: PgPool,
    salt: String,
}

impl RegisterService {
    pub fn new(pool: PgPool, salt: String) -> Self {
        Self { pool, salt }
    }

    /// Creates a user with a fresh external id and `authorized = true`.
    /// Login collisions surface from the unique constraint, not a
    /// pre-check, so there is no race between check and insert.
    pub async fn register(&self, login: &str, password: &str) -> Result<User> {
        tracing::info!(login, "register received");

        let external_id = Uuid::new_v4();
        let hashed = hash_password(&self.salt, password);

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO auth (uuid, login, password, authorized)
            VALUES ($1, $2, $3, TRUE)
            RETURNING id, uuid, login, authorized, authorized_at, quit_at
            "#,
        )
        .bind(external_id)
        .bind(login)
        .bind(&hashed)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match db_error_kind(&err) {
            DbErrorKind::UniqueViolation => Error::UserAlreadyExists,
            _ => {
                tracing::error!(error = ?err, "register failed");
                Error::from(err)
            }
        })?;

        tracing::info!(login, user_id = user.id, "register success");

        Ok(user)
    }

    /// Matches login + password hash in one statement; "no rows" covers
    /// both a wrong login and a wrong password, deliberately not telling
    /// the caller which field was wrong.
    pub async fn login(&self, login: &str, password: &str) -> Result<User> {
        tracing::info!(login, "login received");

        let hashed = hash_password(&self.salt, password);

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE auth
            SET authorized = TRUE, authorized_at = now()
            WHERE login = $1 AND password = $2
            RETURNING id, uuid, login, authorized, authorized_at, quit_at
            "#,
        )
        .bind(login)
        .bind(&hashed)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match db_error_kind(&err) {
            DbErrorKind::NotFound => Error::UserNotFound,
            _ => {
                tracing::error!(error = ?err, "login failed");
                Error::from(err)
            }
        })?;

        tracing::info!(login, user_id = user.id, "login success");

        Ok(user)
    }
}
