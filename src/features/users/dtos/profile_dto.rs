use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::auth::model::AppRole;
use crate::features::users::models::{Profile, WriterRow};
use crate::shared::types::{default_page, default_page_size, PaginationQuery};
use crate::shared::validation::LANGUAGE_REGEX;

/// Profile of the current user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponseDto {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub level: Option<String>,
    pub bio: Option<String>,
    /// Network name → profile URL
    pub social_links: HashMap<String, String>,
    pub preferred_language: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub role: AppRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileResponseDto {
    pub fn from_profile(profile: Profile, role: AppRole) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            full_name: profile.full_name,
            avatar_url: profile.avatar_url,
            level: profile.level,
            bio: profile.bio,
            social_links: social_links_from_json(profile.social_links),
            preferred_language: profile.preferred_language,
            city: profile.city,
            state: profile.state,
            country: profile.country,
            role,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

/// Malformed entries are dropped rather than failing the whole profile
fn social_links_from_json(value: serde_json::Value) -> HashMap<String, String> {
    match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
            .collect(),
        _ => HashMap::new(),
    }
}

/// Request DTO for updating the current user's profile. Omitted fields are kept.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 128, message = "Name must be 1-128 characters"))]
    pub full_name: Option<String>,

    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar_url: Option<String>,

    #[validate(length(max = 2000, message = "Bio must not exceed 2000 characters"))]
    pub bio: Option<String>,

    #[validate(custom(function = "validate_social_links"))]
    pub social_links: Option<HashMap<String, String>>,

    #[validate(regex(path = *LANGUAGE_REGEX, message = "Language must be 'en' or 'ta'"))]
    pub preferred_language: Option<String>,

    #[validate(length(max = 100))]
    pub city: Option<String>,

    #[validate(length(max = 100))]
    pub state: Option<String>,

    #[validate(length(max = 100))]
    pub country: Option<String>,
}

fn validate_social_links(
    links: &HashMap<String, String>,
) -> Result<(), validator::ValidationError> {
    let all_urls = links.values().all(|url| {
        url.starts_with("https://") || url.starts_with("http://")
    });
    if links.len() > 10 || !all_urls {
        return Err(validator::ValidationError::new("social_links"));
    }
    Ok(())
}

/// Public writer directory entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WriterResponseDto {
    pub id: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub level: Option<String>,
    pub bio: Option<String>,
    pub social_links: HashMap<String, String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub role: AppRole,
    pub published_blogs: i64,
}

impl From<WriterRow> for WriterResponseDto {
    fn from(row: WriterRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            avatar_url: row.avatar_url,
            level: row.level,
            bio: row.bio,
            social_links: social_links_from_json(row.social_links),
            city: row.city,
            country: row.country,
            role: row.role,
            published_blogs: row.published_blogs,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct WriterQueryParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// Case-insensitive match on name
    pub search: Option<String>,
    /// Filter by membership level
    pub level: Option<String>,
}

impl WriterQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_social_links_drop_non_string_values() {
        let links = social_links_from_json(serde_json::json!({
            "twitter": "https://x.com/natawo",
            "broken": 42
        }));
        assert_eq!(links.len(), 1);
        assert_eq!(links["twitter"], "https://x.com/natawo");
    }

    #[test]
    fn test_update_rejects_unknown_language() {
        let dto = UpdateProfileDto {
            full_name: None,
            avatar_url: None,
            bio: None,
            social_links: None,
            preferred_language: Some("fr".to_string()),
            city: None,
            state: None,
            country: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_rejects_non_url_social_links() {
        let mut links = HashMap::new();
        links.insert("instagram".to_string(), "natawo".to_string());
        let dto = UpdateProfileDto {
            full_name: Some("Kavya".to_string()),
            avatar_url: None,
            bio: None,
            social_links: Some(links),
            preferred_language: Some("ta".to_string()),
            city: None,
            state: None,
            country: None,
        };
        assert!(dto.validate().is_err());
    }
}
