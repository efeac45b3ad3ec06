use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::database::map_constraint_error;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::blogs::models::RichTextDocument;
use crate::features::events::dtos::{
    CreateEventDto, EventQueryParams, EventTimeframe, UpdateEventDto,
};
use crate::features::events::models::{Event, RegistrantRow, EVENT_COLUMNS};
use crate::modules::realtime::{ChangeAction, ChangeFeed};

/// A new registration must fit under the limit
pub fn ensure_capacity(current: i32, max: Option<i32>) -> Result<()> {
    match max {
        Some(max) if current >= max => Err(AppError::Conflict("Event is full".to_string())),
        _ => Ok(()),
    }
}

/// A limit may not drop below the people already registered
pub fn ensure_limit_covers(current: i32, max: Option<i32>) -> Result<()> {
    match max {
        Some(max) if max < current => Err(AppError::Conflict(format!(
            "{} participants are already registered; the limit cannot be lower",
            current
        ))),
        _ => Ok(()),
    }
}

fn parse_description(value: serde_json::Value) -> Result<serde_json::Value> {
    RichTextDocument::parse(value)
        .map(|doc| doc.to_value())
        .map_err(|e| AppError::Validation(format!("Invalid description: {}", e)))
}

/// Service for events and registrations
pub struct EventService {
    pool: PgPool,
    changes: ChangeFeed,
}

impl EventService {
    pub fn new(pool: PgPool, changes: ChangeFeed) -> Self {
        Self { pool, changes }
    }

    pub async fn list(&self, params: &EventQueryParams) -> Result<(Vec<Event>, i64)> {
        let timeframe = match params.when {
            EventTimeframe::Upcoming => "event_date >= CURRENT_DATE",
            EventTimeframe::Past => "event_date < CURRENT_DATE",
            EventTimeframe::All => "TRUE",
        };
        let filter = format!(
            r#"
            WHERE {}
              AND ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR $2 = ANY(tags))
              AND ($3::text IS NULL OR title ILIKE $3 OR location ILIKE $3)
            "#,
            timeframe
        );
        let direction = params.when.sort().as_sql();
        let pagination = params.pagination();
        let search = params.search_pattern();

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM events {}", filter))
            .bind(&params.category)
            .bind(&params.tag)
            .bind(&search)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count events: {:?}", e);
                AppError::Database(e)
            })?;

        let events = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {} FROM events {}
            ORDER BY event_date {dir}, start_time {dir} NULLS LAST
            LIMIT $4 OFFSET $5
            "#,
            EVENT_COLUMNS,
            filter,
            dir = direction
        ))
        .bind(&params.category)
        .bind(&params.tag)
        .bind(&search)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list events: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((events, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<Event> {
        sqlx::query_as::<_, Event>(&format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get event: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))
    }

    pub async fn is_registered(&self, event_id: Uuid, user_id: &str) -> Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM event_registrations WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check registration: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn create(&self, user: &AuthenticatedUser, dto: CreateEventDto) -> Result<Event> {
        let description = parse_description(dto.description)?;

        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (
                title, description, event_date, start_time, end_time, location,
                max_participants, gallery, category, tags, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(dto.title.trim())
        .bind(description)
        .bind(dto.event_date)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(&dto.location)
        .bind(dto.max_participants)
        .bind(&dto.gallery)
        .bind(&dto.category)
        .bind(&dto.tags)
        .bind(&user.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "Event already exists"))?;

        tracing::info!("Event {} created by {}", event.id, user.user_id);
        self.changes.publish("events", ChangeAction::Insert, event.id);

        Ok(event)
    }

    pub async fn update(&self, id: Uuid, dto: UpdateEventDto) -> Result<Event> {
        let description = dto.description.map(parse_description).transpose()?;

        let mut tx = self.begin().await?;
        let current = Self::lock(&mut tx, id).await?;

        let max_participants = match dto.max_participants {
            Some(max) => max,
            None => current.max_participants,
        };
        ensure_limit_covers(current.current_participants, max_participants)?;

        let start_time = dto.start_time.or(current.start_time);
        let end_time = dto.end_time.or(current.end_time);
        if let (Some(start), Some(end)) = (start_time, end_time) {
            if end <= start {
                return Err(AppError::Validation(
                    "End time must be after start time".to_string(),
                ));
            }
        }

        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                event_date = COALESCE($4, event_date),
                start_time = $5,
                end_time = $6,
                location = COALESCE($7, location),
                max_participants = $8,
                gallery = COALESCE($9, gallery),
                category = COALESCE($10, category),
                tags = COALESCE($11, tags),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(id)
        .bind(dto.title.as_deref().map(str::trim))
        .bind(description)
        .bind(dto.event_date)
        .bind(start_time)
        .bind(end_time)
        .bind(&dto.location)
        .bind(max_participants)
        .bind(&dto.gallery)
        .bind(&dto.category)
        .bind(&dto.tags)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update event: {:?}", e);
            AppError::Database(e)
        })?;

        self.commit(tx).await?;

        tracing::info!("Event {} updated", id);
        self.changes.publish("events", ChangeAction::Update, id);
        Ok(event)
    }

    /// Registrations go with the event (cascade)
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete event: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Event {} not found", id)));
        }

        tracing::info!("Event {} deleted", id);
        self.changes.publish("events", ChangeAction::Delete, id);
        Ok(())
    }

    /// Register the caller. The event row stays locked until the participant
    /// counter is updated so concurrent registrations cannot overfill it.
    pub async fn register(&self, user: &AuthenticatedUser, id: Uuid) -> Result<Event> {
        let mut tx = self.begin().await?;
        let event = Self::lock(&mut tx, id).await?;

        if event.event_date < chrono::Utc::now().date_naive() {
            return Err(AppError::Conflict(
                "Registration is closed for past events".to_string(),
            ));
        }
        ensure_capacity(event.current_participants, event.max_participants)?;

        sqlx::query("INSERT INTO event_registrations (event_id, user_id) VALUES ($1, $2)")
            .bind(id)
            .bind(&user.user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_constraint_error(e, "Already registered for this event"))?;

        let event = Self::adjust_participants(&mut tx, id, 1).await?;
        self.commit(tx).await?;

        tracing::info!("User {} registered for event {}", user.user_id, id);
        self.changes
            .publish("event_registrations", ChangeAction::Insert, id);
        Ok(event)
    }

    pub async fn unregister(&self, user: &AuthenticatedUser, id: Uuid) -> Result<Event> {
        let mut tx = self.begin().await?;
        Self::lock(&mut tx, id).await?;

        let removed =
            sqlx::query("DELETE FROM event_registrations WHERE event_id = $1 AND user_id = $2")
                .bind(id)
                .bind(&user.user_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to remove registration: {:?}", e);
                    AppError::Database(e)
                })?;

        if removed.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "Not registered for this event".to_string(),
            ));
        }

        let event = Self::adjust_participants(&mut tx, id, -1).await?;
        self.commit(tx).await?;

        tracing::info!("User {} unregistered from event {}", user.user_id, id);
        self.changes
            .publish("event_registrations", ChangeAction::Delete, id);
        Ok(event)
    }

    pub async fn registrants(&self, id: Uuid) -> Result<Vec<RegistrantRow>> {
        self.get(id).await?;

        sqlx::query_as::<_, RegistrantRow>(
            r#"
            SELECT r.event_id, r.user_id, p.full_name, p.email, r.created_at
            FROM event_registrations r
            LEFT JOIN profiles p ON p.id = r.user_id
            WHERE r.event_id = $1
            ORDER BY r.created_at
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list registrants: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Give back the seats held by `user_id` ahead of their registrations
    /// being removed with the profile. Returns the number of events touched.
    pub async fn release_registrations_tx(
        tx: &mut Transaction<'static, Postgres>,
        user_id: &str,
    ) -> Result<u64> {
        let released = sqlx::query(
            r#"
            UPDATE events
            SET current_participants = GREATEST(current_participants - 1, 0), updated_at = NOW()
            WHERE id IN (SELECT event_id FROM event_registrations WHERE user_id = $1)
            "#,
        )
        .bind(user_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to release registrations of {}: {:?}", user_id, e);
            AppError::Database(e)
        })?;

        Ok(released.rows_affected())
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn commit(&self, tx: Transaction<'static, Postgres>) -> Result<()> {
        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit transaction: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn lock(tx: &mut Transaction<'static, Postgres>, id: Uuid) -> Result<Event> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE id = $1 FOR UPDATE",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to lock event: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))
    }

    async fn adjust_participants(
        tx: &mut Transaction<'static, Postgres>,
        id: Uuid,
        delta: i32,
    ) -> Result<Event> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET current_participants = GREATEST(current_participants + $2, 0), updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(id)
        .bind(delta)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update participant count: {:?}", e);
            AppError::Database(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_rejects_full_event() {
        assert!(ensure_capacity(9, Some(10)).is_ok());
        assert!(matches!(
            ensure_capacity(10, Some(10)),
            Err(AppError::Conflict(_))
        ));
        assert!(ensure_capacity(10_000, None).is_ok());
    }

    #[test]
    fn test_limit_cannot_drop_below_registrations() {
        assert!(ensure_limit_covers(5, Some(5)).is_ok());
        assert!(ensure_limit_covers(5, None).is_ok());
        assert!(matches!(
            ensure_limit_covers(6, Some(5)),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_description_accepts_plain_text() {
        let value = parse_description(serde_json::json!("Bring a poem to share")).unwrap();
        let doc = RichTextDocument::from_stored(value);
        assert_eq!(doc.plain_text(), "Bring a poem to share");
    }
}
