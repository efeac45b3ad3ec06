use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::auth;
use crate::features::blogs::{
    dtos as blogs_dtos, handlers as blogs_handlers, models as blogs_models,
};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::comments::{
    dtos as comments_dtos, handlers as comments_handlers, models as comments_models,
};
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::events::{dtos as events_dtos, handlers as events_handlers};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::notifications::handlers as notifications_handlers;
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::modules::realtime::{ChangeAction, ChangeEvent};
use crate::shared::types::{ApiResponse, Meta, SortDirection};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::get_me,
        // Profile and writers
        users_handlers::get_profile,
        users_handlers::update_profile,
        users_handlers::list_writers,
        users_handlers::get_writer,
        // Notifications
        notifications_handlers::password_changed,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::create_category,
        // Blogs
        blogs_handlers::list_published,
        blogs_handlers::get_published,
        blogs_handlers::create_blog,
        blogs_handlers::list_my_blogs,
        blogs_handlers::get_blog_for_edit,
        blogs_handlers::autosave_draft,
        blogs_handlers::get_draft_status,
        blogs_handlers::flush_draft,
        blogs_handlers::submit_blog,
        blogs_handlers::withdraw_blog,
        blogs_handlers::revise_blog,
        blogs_handlers::delete_blog,
        blogs_handlers::translate_blog,
        blogs_handlers::translate_text,
        // Review
        blogs_handlers::list_review_queue,
        blogs_handlers::approve_blog,
        blogs_handlers::reject_blog,
        blogs_handlers::publish_blog,
        blogs_handlers::unpublish_blog,
        // Events
        events_handlers::list_events,
        events_handlers::get_event,
        events_handlers::create_event,
        events_handlers::update_event,
        events_handlers::delete_event,
        events_handlers::register_for_event,
        events_handlers::unregister_from_event,
        events_handlers::list_registrations,
        // Comments and ratings
        comments_handlers::list_comments,
        comments_handlers::create_comment,
        comments_handlers::delete_comment,
        comments_handlers::react_to_comment,
        comments_handlers::get_rating,
        comments_handlers::rate,
        // Files
        files_handlers::upload_file,
        files_handlers::delete_file_by_url,
        // Dashboard
        dashboard_handlers::get_writer_dashboard,
        dashboard_handlers::get_admin_stats,
        // Admin
        admin_handlers::list_users,
        admin_handlers::create_user,
        admin_handlers::delete_user,
        admin_handlers::update_user_role,
        admin_handlers::stream_changes,
    ),
    components(
        schemas(
            // Shared
            Meta,
            SortDirection,
            ChangeAction,
            ChangeEvent,
            // Auth
            auth::dto::MeResponseDto,
            auth::dto::CapabilitiesDto,
            auth::model::AuthenticatedUser,
            auth::model::AppRole,
            ApiResponse<auth::dto::MeResponseDto>,
            // Users
            users_dtos::ProfileResponseDto,
            users_dtos::UpdateProfileDto,
            users_dtos::WriterResponseDto,
            ApiResponse<users_dtos::ProfileResponseDto>,
            ApiResponse<users_dtos::WriterResponseDto>,
            ApiResponse<Vec<users_dtos::WriterResponseDto>>,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::CreateCategoryDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            // Blogs
            blogs_models::BlogStatus,
            blogs_models::BlogAction,
            blogs_models::RichTextDocument,
            blogs_models::document::Block,
            blogs_dtos::CreateBlogDto,
            blogs_dtos::DraftPatchDto,
            blogs_dtos::RejectBlogDto,
            blogs_dtos::BlogResponseDto,
            blogs_dtos::BlogSummaryDto,
            blogs_dtos::DraftStatusDto,
            blogs_dtos::TranslationDirection,
            blogs_dtos::TranslateBlogDto,
            blogs_dtos::TranslateTextDto,
            blogs_dtos::TranslateTextResponseDto,
            ApiResponse<blogs_dtos::BlogResponseDto>,
            ApiResponse<Vec<blogs_dtos::BlogSummaryDto>>,
            ApiResponse<blogs_dtos::DraftStatusDto>,
            ApiResponse<blogs_dtos::TranslateTextResponseDto>,
            // Events
            events_dtos::EventResponseDto,
            events_dtos::CreateEventDto,
            events_dtos::UpdateEventDto,
            events_dtos::EventTimeframe,
            events_dtos::RegistrantDto,
            ApiResponse<events_dtos::EventResponseDto>,
            ApiResponse<Vec<events_dtos::EventResponseDto>>,
            ApiResponse<Vec<events_dtos::RegistrantDto>>,
            // Comments
            comments_models::CommentTarget,
            comments_models::ReactionKind,
            comments_dtos::CommentResponseDto,
            comments_dtos::CreateCommentDto,
            comments_dtos::ReactDto,
            comments_dtos::ReactionResponseDto,
            comments_dtos::RateDto,
            comments_dtos::RatingSummaryDto,
            ApiResponse<comments_dtos::CommentResponseDto>,
            ApiResponse<Vec<comments_dtos::CommentResponseDto>>,
            ApiResponse<comments_dtos::ReactionResponseDto>,
            ApiResponse<comments_dtos::RatingSummaryDto>,
            // Files
            files_dtos::FilePurpose,
            files_dtos::UploadFileDto,
            files_dtos::FileResponseDto,
            files_dtos::DeleteFileByUrlDto,
            files_dtos::DeleteFileResponseDto,
            ApiResponse<files_dtos::FileResponseDto>,
            ApiResponse<files_dtos::DeleteFileResponseDto>,
            // Dashboard
            dashboard_dtos::BlogStatusCountsDto,
            dashboard_dtos::RecentBlogDto,
            dashboard_dtos::WriterDashboardDto,
            dashboard_dtos::UserCountsDto,
            dashboard_dtos::ActivityCountsDto,
            dashboard_dtos::AdminStatsDto,
            ApiResponse<dashboard_dtos::WriterDashboardDto>,
            ApiResponse<dashboard_dtos::AdminStatsDto>,
            // Admin
            admin_dtos::AdminUserDto,
            admin_dtos::CreateUserDto,
            admin_dtos::UpdateRoleDto,
            admin_dtos::DeleteUserResponseDto,
            ApiResponse<admin_dtos::AdminUserDto>,
            ApiResponse<Vec<admin_dtos::AdminUserDto>>,
            ApiResponse<admin_dtos::DeleteUserResponseDto>,
        )
    ),
    tags(
        (name = "auth", description = "Session introspection"),
        (name = "users", description = "Profile of the signed-in user"),
        (name = "writers", description = "Public writers directory"),
        (name = "notifications", description = "Transactional notification emails"),
        (name = "categories", description = "Blog categories"),
        (name = "blogs", description = "Blog authoring, autosave and translation"),
        (name = "translation", description = "English and Tamil machine translation"),
        (name = "review", description = "Blog review workflow (manager and admin)"),
        (name = "events", description = "Events and registration"),
        (name = "comments", description = "Comments, reactions and ratings"),
        (name = "files", description = "Image uploads"),
        (name = "Dashboard", description = "Writer dashboard and admin statistics"),
        (name = "admin", description = "User administration (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "NATAWO API",
        version = "0.1.0",
        description = "API documentation for the NATAWO writers' organization",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_covers_blog_lifecycle() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/blogs/{id}/submit"));
        assert!(paths.contains_key("/api/review/blogs/{id}/approve"));
        assert!(paths.contains_key("/api/admin/changes"));
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
