use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{db_error_kind, DbErrorKind, Error, Result};
use crate::models::user::User;

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Authorization gate for every protected route.
    pub async fn authenticated(&self, external_id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, uuid, login, authorized, authorized_at, quit_at
            FROM auth
            WHERE uuid = $1
            "#,
        )
        .bind(external_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match db_error_kind(&err) {
            DbErrorKind::NotFound => Error::UserNotFound,
            _ => {
                tracing::error!(error = ?err, "authenticated lookup failed");
                Error::from(err)
            }
        })?;

        if !user.authorized {
            return Err(Error::UserNotAuthorized);
        }

        Ok(user)
    }

    pub async fn quit(&self, external_id: Uuid) -> Result<()> {
        tracing::info!(%external_id, "quit received");

        let result = sqlx::query(
            r#"
            UPDATE auth
            SET authorized = FALSE, quit_at = now()
            WHERE uuid = $1
            "#,
        )
        .bind(external_id)
        .execute(&self.pool)
        .await?;

        // Zero affected rows is the not-found signal, not a thrown error.
        if result.rows_affected() == 0 {
            return Err(Error::UserNotFound);
        }

        tracing::info!(%external_id, "quit success");

        Ok(())
    }
}
