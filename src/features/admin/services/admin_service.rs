use sqlx::PgPool;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::{AdminUserDto, AdminUserQueryParams, CreateUserDto};
use crate::features::admin::models::{AdminUserRow, ADMIN_USER_COLUMNS};
use crate::features::auth::model::{AppRole, AuthenticatedUser};
use crate::features::events::services::EventService;
use crate::features::notifications::services::{NotificationService, Recipient};
use crate::features::users::clients::logto::{IdentityDirectory, NewIdentity};
use crate::features::users::services::RoleService;
use crate::modules::realtime::{ChangeAction, ChangeFeed};

/// User administration: listing, provisioning, deletion and roles.
///
/// Provisioning and deletion span the identity provider and the database.
/// The database side runs in a transaction that only commits once the
/// identity provider call has succeeded.
pub struct AdminService {
    pool: PgPool,
    identity: Arc<dyn IdentityDirectory>,
    roles: Arc<RoleService>,
    notifications: Arc<NotificationService>,
    changes: ChangeFeed,
}

impl AdminService {
    pub fn new(
        pool: PgPool,
        identity: Arc<dyn IdentityDirectory>,
        roles: Arc<RoleService>,
        notifications: Arc<NotificationService>,
        changes: ChangeFeed,
    ) -> Self {
        Self {
            pool,
            identity,
            roles,
            notifications,
            changes,
        }
    }

    pub async fn list_users(
        &self,
        params: &AdminUserQueryParams,
    ) -> Result<(Vec<AdminUserDto>, i64)> {
        let page = params.pagination();
        let search = params.search_pattern();

        let filter = r#"
            WHERE ($1::text IS NULL OR p.full_name ILIKE $1 OR p.email ILIKE $1)
              AND ($2::app_role IS NULL OR COALESCE(r.role, 'reader'::app_role) = $2)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM profiles p LEFT JOIN user_roles r ON r.user_id = p.id {}",
            filter
        ))
        .bind(&search)
        .bind(params.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count users: {:?}", e);
            AppError::Database(e)
        })?;

        let rows = sqlx::query_as::<_, AdminUserRow>(&format!(
            r#"
            SELECT {}
            FROM profiles p
            LEFT JOIN user_roles r ON r.user_id = p.id
            {}
            ORDER BY p.created_at DESC
            OFFSET $3 LIMIT $4
            "#,
            ADMIN_USER_COLUMNS, filter
        ))
        .bind(&search)
        .bind(params.role)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list users: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((rows.into_iter().map(AdminUserDto::from).collect(), total))
    }

    pub async fn get_user(&self, user_id: &str) -> Result<AdminUserDto> {
        sqlx::query_as::<_, AdminUserRow>(&format!(
            r#"
            SELECT {}
            FROM profiles p
            LEFT JOIN user_roles r ON r.user_id = p.id
            WHERE p.id = $1
            "#,
            ADMIN_USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user {}: {:?}", user_id, e);
            AppError::Database(e)
        })?
        .map(AdminUserDto::from)
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    /// create-user: identity account, then profile and role rows.
    ///
    /// If the database side fails, the freshly created identity is deleted
    /// again so no account exists without a profile.
    pub async fn create_user(&self, dto: CreateUserDto) -> Result<AdminUserDto> {
        let email = dto.email.trim().to_lowercase();
        let full_name = dto
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let user_id = self
            .identity
            .create_user(&NewIdentity {
                email: email.clone(),
                password: dto.password,
                name: full_name.clone(),
            })
            .await?;

        if let Err(e) = self
            .insert_profile(&user_id, &email, full_name.as_deref(), dto.level.as_deref(), dto.role)
            .await
        {
            tracing::warn!("Provisioning {} failed, removing identity: {}", user_id, e);
            if let Err(cleanup) = self.identity.delete_user(&user_id).await {
                tracing::error!("Orphaned identity {}: {}", user_id, cleanup);
            }
            return Err(e);
        }

        tracing::info!("Provisioned user {} with role {}", user_id, dto.role);
        self.changes
            .publish("profiles", ChangeAction::Insert, &user_id);

        if let Some(recipient) = Recipient::new(Some(&email), full_name.as_deref()) {
            let notifications = self.notifications.clone();
            tokio::spawn(async move {
                notifications.send_signup(&recipient).await;
            });
        }

        self.get_user(&user_id).await
    }

    async fn insert_profile(
        &self,
        user_id: &str,
        email: &str,
        full_name: Option<&str>,
        level: Option<&str>,
        role: AppRole,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query(
            r#"
            INSERT INTO profiles (id, email, full_name, level)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(full_name)
        .bind(level)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert profile {}: {:?}", user_id, e);
            AppError::Database(e)
        })?;

        RoleService::set_role_tx(&mut tx, user_id, role)
            .await
            .map_err(|e| {
                tracing::error!("Failed to assign role to {}: {:?}", user_id, e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    /// delete-user: role and profile rows are removed in a transaction that
    /// commits only after the identity account is gone. Authored content
    /// follows the profile through foreign-key cascades.
    pub async fn delete_user(&self, admin: &AuthenticatedUser, user_id: &str) -> Result<()> {
        ensure_not_self(admin, user_id, "delete your own account")?;

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete role of {}: {:?}", user_id, e);
                AppError::Database(e)
            })?;

        // Registrations cascade with the profile; hand their seats back first
        let released = EventService::release_registrations_tx(&mut tx, user_id).await?;
        if released > 0 {
            tracing::debug!("Released {} event seats of {}", released, user_id);
        }

        let deleted = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete profile {}: {:?}", user_id, e);
                AppError::Database(e)
            })?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        // Dropping `tx` on error rolls the rows back
        self.identity.delete_user(user_id).await?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("User {} deleted by {}", user_id, admin.user_id);
        self.changes
            .publish("profiles", ChangeAction::Delete, user_id);

        Ok(())
    }

    pub async fn update_role(
        &self,
        admin: &AuthenticatedUser,
        user_id: &str,
        role: AppRole,
    ) -> Result<AdminUserDto> {
        if role < AppRole::Admin {
            ensure_not_self(admin, user_id, "remove your own admin role")?;
        }

        self.roles.set_role(user_id, role).await?;
        self.changes
            .publish("user_roles", ChangeAction::Update, user_id);

        self.get_user(user_id).await
    }
}

/// Admins cannot lock themselves out
fn ensure_not_self(admin: &AuthenticatedUser, user_id: &str, action: &str) -> Result<()> {
    if admin.user_id == user_id {
        return Err(AppError::BadRequest(format!("You cannot {}", action)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::create_admin_user;

    #[test]
    fn test_admin_cannot_target_self() {
        let admin = create_admin_user();
        assert!(matches!(
            ensure_not_self(&admin, &admin.user_id, "delete your own account"),
            Err(AppError::BadRequest(_))
        ));
        assert!(ensure_not_self(&admin, "someone-else", "delete your own account").is_ok());
    }

    /// Run with `DATABASE_URL` set: `cargo test -- --ignored`
    mod with_database {
        use super::*;
        use crate::features::events::services::EventService;
        use crate::features::notifications::services::notification_service::tests::{
            service_with, RecordingMailer,
        };
        use crate::features::users::clients::logto::NewIdentity;
        use crate::shared::test_helpers::create_user;
        use async_trait::async_trait;
        use chrono::{Duration, Utc};
        use std::sync::atomic::{AtomicUsize, Ordering};
        use uuid::Uuid;

        #[derive(Default)]
        struct ScriptedDirectory {
            fail_delete: bool,
            deleted: AtomicUsize,
        }

        #[async_trait]
        impl IdentityDirectory for ScriptedDirectory {
            async fn create_user(&self, _identity: &NewIdentity) -> Result<String> {
                Ok("unused".to_string())
            }

            async fn delete_user(&self, _user_id: &str) -> Result<()> {
                if self.fail_delete {
                    return Err(AppError::ExternalServiceError(
                        "identity provider unavailable".to_string(),
                    ));
                }
                self.deleted.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        fn admin_service(pool: PgPool, directory: Arc<ScriptedDirectory>) -> AdminService {
            AdminService::new(
                pool.clone(),
                directory,
                Arc::new(RoleService::new(pool)),
                Arc::new(service_with(Arc::new(RecordingMailer::default()), None)),
                ChangeFeed::new(),
            )
        }

        async fn seed_member(pool: &PgPool, role: AppRole) -> AuthenticatedUser {
            let member = AuthenticatedUser {
                user_id: format!("member-{}", Uuid::new_v4()),
                ..create_user(role)
            };
            sqlx::query("INSERT INTO profiles (id, email) VALUES ($1, $2)")
                .bind(&member.user_id)
                .bind(&member.email)
                .execute(pool)
                .await
                .unwrap();
            RoleService::new(pool.clone())
                .set_role(&member.user_id, role)
                .await
                .unwrap();
            member
        }

        async fn seed_event(pool: &PgPool, max_participants: i32) -> Uuid {
            sqlx::query_scalar(
                r#"
                INSERT INTO events (title, event_date, max_participants, created_by)
                VALUES ('Poetry night', $1, $2, 'test-admin')
                RETURNING id
                "#,
            )
            .bind((Utc::now() + Duration::days(30)).date_naive())
            .bind(max_participants)
            .fetch_one(pool)
            .await
            .unwrap()
        }

        async fn role_rows(pool: &PgPool, user_id: &str) -> i64 {
            sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await
                .unwrap()
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "requires a Postgres DATABASE_URL"]
        async fn test_delete_user_frees_event_seats_and_roles(pool: PgPool) {
            let events = EventService::new(pool.clone(), ChangeFeed::new());
            let leaving = seed_member(&pool, AppRole::Writer).await;
            let newcomer = seed_member(&pool, AppRole::Reader).await;
            let event_id = seed_event(&pool, 1).await;

            let event = events.register(&leaving, event_id).await.unwrap();
            assert_eq!(event.current_participants, 1);

            let directory = Arc::new(ScriptedDirectory::default());
            admin_service(pool.clone(), directory.clone())
                .delete_user(&create_admin_user(), &leaving.user_id)
                .await
                .unwrap();

            assert_eq!(directory.deleted.load(Ordering::SeqCst), 1);
            assert_eq!(role_rows(&pool, &leaving.user_id).await, 0);
            assert_eq!(events.get(event_id).await.unwrap().current_participants, 0);

            // The freed seat is available again
            let event = events.register(&newcomer, event_id).await.unwrap();
            assert_eq!(event.current_participants, 1);
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "requires a Postgres DATABASE_URL"]
        async fn test_identity_failure_keeps_user_rows(pool: PgPool) {
            let events = EventService::new(pool.clone(), ChangeFeed::new());
            let member = seed_member(&pool, AppRole::Writer).await;
            let event_id = seed_event(&pool, 5).await;
            events.register(&member, event_id).await.unwrap();

            let directory = Arc::new(ScriptedDirectory {
                fail_delete: true,
                ..Default::default()
            });
            let service = admin_service(pool.clone(), directory);

            let err = service
                .delete_user(&create_admin_user(), &member.user_id)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ExternalServiceError(_)));

            // Nothing was committed
            assert_eq!(role_rows(&pool, &member.user_id).await, 1);
            assert_eq!(service.get_user(&member.user_id).await.unwrap().role, AppRole::Writer);
            assert_eq!(events.get(event_id).await.unwrap().current_participants, 1);
            assert_eq!(events.registrants(event_id).await.unwrap().len(), 1);
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "requires a Postgres DATABASE_URL"]
        async fn test_delete_unknown_user_is_not_found(pool: PgPool) {
            let directory = Arc::new(ScriptedDirectory::default());
            let err = admin_service(pool, directory.clone())
                .delete_user(&create_admin_user(), "nobody")
                .await
                .unwrap_err();

            assert!(matches!(err, AppError::NotFound(_)));
            assert_eq!(directory.deleted.load(Ordering::SeqCst), 0);
        }
    }
}
