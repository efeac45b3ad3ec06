use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::Category;
use crate::shared::validation::SLUG_REGEX;

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub name: String,
    pub name_tamil: Option<String>,
    pub slug: String,
    pub description: Option<String>,
    pub display_order: i32,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            name_tamil: c.name_tamil,
            slug: c.slug,
            description: c.description,
            display_order: c.display_order,
        }
    }
}

/// Request DTO for creating a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 100, message = "Tamil name must be at most 100 characters"))]
    pub name_tamil: Option<String>,

    /// Lowercase words joined by hyphens; derived from `name` when omitted
    #[validate(regex(path = *SLUG_REGEX, message = "Slug must be lowercase words separated by hyphens"))]
    pub slug: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub display_order: i32,
}

impl CreateCategoryDto {
    pub fn resolved_slug(&self) -> String {
        match &self.slug {
            Some(slug) => slug.clone(),
            None => slugify(&self.name),
        }
    }
}

/// Lowercase ASCII words joined by single hyphens
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Short Stories"), "short-stories");
        assert_eq!(slugify("  Poetry & Verse!! "), "poetry-verse");
        assert_eq!(slugify("கவிதை"), "");
    }

    #[test]
    fn test_slug_validation() {
        let dto = CreateCategoryDto {
            name: "Essays".to_string(),
            name_tamil: Some("கட்டுரைகள்".to_string()),
            slug: Some("Bad Slug".to_string()),
            description: None,
            display_order: 0,
        };
        assert!(dto.validate().is_err());

        let dto = CreateCategoryDto {
            slug: None,
            ..dto
        };
        assert!(dto.validate().is_ok());
        assert_eq!(dto.resolved_slug(), "essays");
    }
}
