pub mod blog;
pub mod document;
pub mod draft;
pub mod status;

pub use blog::{BlogRow, BLOG_SELECT};
pub use document::RichTextDocument;
pub use draft::{BlogDraft, DraftFields, DraftPatch};
pub use status::{BlogAction, BlogStatus};
