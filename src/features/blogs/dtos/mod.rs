pub mod blog_dto;
pub mod translation_dto;

pub use blog_dto::{
    BlogQueryParams, BlogResponseDto, BlogSummaryDto, CreateBlogDto, DraftPatchDto,
    DraftStatusDto, RejectBlogDto, ReviewQueryParams,
};
pub use translation_dto::{
    TranslateBlogDto, TranslateTextDto, TranslateTextResponseDto, TranslationDirection,
};
