use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::features::blogs::models::RichTextDocument;
use crate::features::events::models::{Event, RegistrantRow};
use crate::shared::constants::MAX_TITLE_LENGTH;
use crate::shared::types::{default_page, default_page_size, PaginationQuery, SortDirection};

const MAX_GALLERY_IMAGES: usize = 30;
const MAX_TAGS: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventResponseDto {
    pub id: Uuid,
    pub title: String,
    pub description: RichTextDocument,
    pub event_date: NaiveDate,
    #[schema(value_type = Option<String>, example = "18:30:00")]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "20:00:00")]
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub current_participants: i32,
    pub max_participants: Option<i32>,
    /// Remaining places; `None` when unlimited
    pub spots_left: Option<i32>,
    pub is_full: bool,
    pub gallery: Vec<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub created_by: String,
    /// Whether the caller is registered; absent for anonymous visitors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_registered: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventResponseDto {
    pub fn from_event(event: Event, is_registered: Option<bool>) -> Self {
        Self {
            spots_left: event.spots_left(),
            is_full: event.is_full(),
            id: event.id,
            title: event.title,
            description: RichTextDocument::from_stored(event.description),
            event_date: event.event_date,
            start_time: event.start_time,
            end_time: event.end_time,
            location: event.location,
            current_participants: event.current_participants,
            max_participants: event.max_participants,
            gallery: event.gallery,
            category: event.category,
            tags: event.tags,
            created_by: event.created_by,
            is_registered,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

impl From<Event> for EventResponseDto {
    fn from(event: Event) -> Self {
        Self::from_event(event, None)
    }
}

/// Request DTO for creating an event (manager+)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_times"))]
pub struct CreateEventDto {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH, message = "Title must be 1-300 characters"))]
    pub title: String,

    /// Rich-text document, serialized document string or plain text
    #[serde(default)]
    #[schema(value_type = Object)]
    pub description: serde_json::Value,

    pub event_date: NaiveDate,

    #[schema(value_type = Option<String>, example = "18:30:00")]
    pub start_time: Option<NaiveTime>,

    #[schema(value_type = Option<String>, example = "20:00:00")]
    pub end_time: Option<NaiveTime>,

    #[validate(length(max = 300, message = "Location must be at most 300 characters"))]
    pub location: Option<String>,

    #[validate(range(min = 1, message = "Maximum participants must be at least 1"))]
    pub max_participants: Option<i32>,

    #[serde(default)]
    #[validate(custom(function = "validate_gallery"))]
    pub gallery: Vec<String>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_tags"))]
    pub tags: Vec<String>,
}

/// Request DTO for updating an event. Omitted fields are kept;
/// `max_participants: null` removes the limit.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_update_times"))]
pub struct UpdateEventDto {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH, message = "Title must be 1-300 characters"))]
    pub title: Option<String>,

    #[schema(value_type = Option<Object>)]
    pub description: Option<serde_json::Value>,

    pub event_date: Option<NaiveDate>,

    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,

    #[schema(value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,

    #[validate(length(max = 300, message = "Location must be at most 300 characters"))]
    pub location: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub max_participants: Option<Option<i32>>,

    #[validate(custom(function = "validate_gallery"))]
    pub gallery: Option<Vec<String>>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    #[validate(custom(function = "validate_tags"))]
    pub tags: Option<Vec<String>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<i32>::deserialize(deserializer).map(Some)
}

fn check_times(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end <= start => {
            let mut err = ValidationError::new("end_time");
            err.message = Some("End time must be after start time".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

fn validate_create_times(dto: &CreateEventDto) -> Result<(), ValidationError> {
    check_times(dto.start_time, dto.end_time)
}

fn validate_update_times(dto: &UpdateEventDto) -> Result<(), ValidationError> {
    check_times(dto.start_time, dto.end_time)?;
    if let Some(Some(max)) = dto.max_participants {
        if max < 1 {
            let mut err = ValidationError::new("max_participants");
            err.message = Some("Maximum participants must be at least 1".into());
            return Err(err);
        }
    }
    Ok(())
}

fn validate_gallery(urls: &[String]) -> Result<(), ValidationError> {
    let all_urls = urls
        .iter()
        .all(|url| url.starts_with("https://") || url.starts_with("http://"));
    if urls.len() > MAX_GALLERY_IMAGES || !all_urls {
        return Err(ValidationError::new("gallery"));
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS || tags.iter().any(|t| t.trim().is_empty() || t.len() > 50) {
        return Err(ValidationError::new("tags"));
    }
    Ok(())
}

/// Listing window relative to today
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventTimeframe {
    #[default]
    Upcoming,
    Past,
    All,
}

impl EventTimeframe {
    /// Upcoming events read soonest first, past events most recent first
    pub fn sort(self) -> SortDirection {
        match self {
            EventTimeframe::Upcoming => SortDirection::Asc,
            EventTimeframe::Past | EventTimeframe::All => SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct EventQueryParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// `upcoming` (default), `past` or `all`
    #[serde(default)]
    pub when: EventTimeframe,
    pub category: Option<String>,
    pub tag: Option<String>,
    /// Case-insensitive match on title or location
    pub search: Option<String>,
}

impl EventQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }

    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrantDto {
    pub user_id: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl From<RegistrantRow> for RegistrantDto {
    fn from(row: RegistrantRow) -> Self {
        Self {
            user_id: row.user_id,
            full_name: row.full_name,
            email: row.email,
            registered_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_dto(value: serde_json::Value) -> CreateEventDto {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_end_time_must_follow_start_time() {
        let dto = create_dto(json!({
            "title": "Book launch",
            "event_date": "2026-11-02",
            "start_time": "18:00:00",
            "end_time": "17:30:00"
        }));
        assert!(dto.validate().is_err());

        let dto = create_dto(json!({
            "title": "Book launch",
            "event_date": "2026-11-02",
            "start_time": "18:00:00",
            "end_time": "20:00:00"
        }));
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_capacity_must_be_positive() {
        let dto = create_dto(json!({
            "title": "Workshop",
            "event_date": "2026-11-02",
            "max_participants": 0
        }));
        assert!(dto.validate().is_err());

        let update: UpdateEventDto =
            serde_json::from_value(json!({ "max_participants": 0 })).unwrap();
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_null_capacity_removes_limit() {
        let update: UpdateEventDto =
            serde_json::from_value(json!({ "max_participants": null })).unwrap();
        assert_eq!(update.max_participants, Some(None));

        let update: UpdateEventDto = serde_json::from_value(json!({})).unwrap();
        assert_eq!(update.max_participants, None);
    }

    #[test]
    fn test_gallery_accepts_only_urls() {
        let dto = create_dto(json!({
            "title": "Reading circle",
            "event_date": "2026-11-02",
            "gallery": ["https://cdn.example.org/a.jpg", "not a url"]
        }));
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_timeframe_defaults_to_upcoming() {
        let params: EventQueryParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(params.when, EventTimeframe::Upcoming);
        assert!(matches!(params.when.sort(), SortDirection::Asc));
    }
}
