use sqlx::PgPool;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AppRole, AuthenticatedUser};
use crate::features::notifications::services::{NotificationService, Recipient};
use crate::features::users::dtos::{ProfileResponseDto, UpdateProfileDto};
use crate::features::users::models::Profile;
use crate::modules::realtime::{ChangeAction, ChangeFeed};

const PROFILE_COLUMNS: &str = r#"
    id, email, full_name, avatar_url, level, bio, social_links, preferred_language,
    city, state, country, created_at, updated_at
"#;

/// Service for the current user's profile
pub struct UserProfileService {
    pool: PgPool,
    notifications: Arc<NotificationService>,
    changes: ChangeFeed,
}

impl UserProfileService {
    pub fn new(pool: PgPool, notifications: Arc<NotificationService>, changes: ChangeFeed) -> Self {
        Self {
            pool,
            notifications,
            changes,
        }
    }

    /// Get the caller's profile, provisioning profile and reader role on
    /// first access. New members receive the signup notifications.
    pub async fn get_or_provision(&self, user: &AuthenticatedUser) -> Result<ProfileResponseDto> {
        if let Some(profile) = self.find(&user.user_id).await? {
            return Ok(ProfileResponseDto::from_profile(profile, user.role));
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let inserted = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (id, email, full_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(&user.user_id)
        .bind(&user.email)
        .bind(&user.name)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to provision profile: {:?}", e);
            AppError::Database(e)
        })?;

        // Lost a race with a concurrent first request
        let Some(profile) = inserted else {
            tx.rollback().await.map_err(AppError::Database)?;
            let profile = self
                .find(&user.user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
            return Ok(ProfileResponseDto::from_profile(profile, user.role));
        };

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(&user.user_id)
        .bind(AppRole::Reader)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to assign default role: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Provisioned profile for {}", user.user_id);
        self.changes
            .publish("profiles", ChangeAction::Insert, &profile.id);

        if let Some(recipient) = Recipient::new(profile.email.as_deref(), profile.full_name.as_deref()) {
            let notifications = self.notifications.clone();
            tokio::spawn(async move {
                notifications.send_signup(&recipient).await;
            });
        }

        Ok(ProfileResponseDto::from_profile(profile, user.role))
    }

    pub async fn find(&self, user_id: &str) -> Result<Option<Profile>> {
        sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get profile: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        dto: UpdateProfileDto,
    ) -> Result<ProfileResponseDto> {
        let social_links = dto
            .social_links
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles SET
                full_name = COALESCE($2, full_name),
                avatar_url = COALESCE($3, avatar_url),
                bio = COALESCE($4, bio),
                social_links = COALESCE($5, social_links),
                preferred_language = COALESCE($6, preferred_language),
                city = COALESCE($7, city),
                state = COALESCE($8, state),
                country = COALESCE($9, country),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(&user.user_id)
        .bind(dto.full_name)
        .bind(dto.avatar_url)
        .bind(dto.bio)
        .bind(social_links)
        .bind(dto.preferred_language)
        .bind(dto.city)
        .bind(dto.state)
        .bind(dto.country)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update profile: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        self.changes
            .publish("profiles", ChangeAction::Update, &profile.id);

        Ok(ProfileResponseDto::from_profile(profile, user.role))
    }
}
