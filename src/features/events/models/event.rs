use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for event
#[derive(Debug, Clone, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    /// Rich-text document (jsonb)
    pub description: serde_json::Value,
    pub event_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub current_participants: i32,
    /// `None` means unlimited
    pub max_participants: Option<i32>,
    pub gallery: Vec<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn spots_left(&self) -> Option<i32> {
        self.max_participants
            .map(|max| (max - self.current_participants).max(0))
    }

    pub fn is_full(&self) -> bool {
        self.spots_left() == Some(0)
    }
}

pub const EVENT_COLUMNS: &str = r#"
    id, title, description, event_date, start_time, end_time, location,
    current_participants, max_participants, gallery, category, tags,
    created_by, created_at, updated_at
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn event(current: i32, max: Option<i32>) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: "Poetry evening".to_string(),
            description: serde_json::Value::Null,
            event_date: NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(),
            start_time: None,
            end_time: None,
            location: None,
            current_participants: current,
            max_participants: max,
            gallery: vec![],
            category: None,
            tags: vec![],
            created_by: "test-manager".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_spots_left() {
        assert_eq!(event(3, Some(10)).spots_left(), Some(7));
        assert!(event(10, Some(10)).is_full());
        assert_eq!(event(12, Some(10)).spots_left(), Some(0));
        assert_eq!(event(500, None).spots_left(), None);
        assert!(!event(500, None).is_full());
    }
}
