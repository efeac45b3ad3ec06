use sqlx::{PgPool, Postgres, Transaction};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AppRole;

/// Reads and writes `user_roles`. Roles are authoritative here, not in tokens.
pub struct RoleService {
    pool: PgPool,
}

impl RoleService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn role_of(&self, user_id: &str) -> Result<Option<AppRole>> {
        sqlx::query_scalar::<_, AppRole>("SELECT role FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load role for {}: {:?}", user_id, e);
                AppError::Database(e)
            })
    }

    /// Whether the user holds at least `role`
    pub async fn has_role(&self, user_id: &str, role: AppRole) -> Result<bool> {
        Ok(self
            .role_of(user_id)
            .await?
            .is_some_and(|current| current >= role))
    }

    /// Assign a role inside a caller-owned transaction
    pub async fn set_role_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: &str,
        role: AppRole,
    ) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(user_id)
        .bind(role)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn set_role(&self, user_id: &str, role: AppRole) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE user_roles SET role = $2
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to set role for {}: {:?}", user_id, e);
            AppError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        tracing::info!("Role of {} set to {}", user_id, role);
        Ok(())
    }
}
