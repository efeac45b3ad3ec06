pub mod blog_handler;
pub mod review_handler;
pub mod translation_handler;

pub use blog_handler::{
    __path_autosave_draft, __path_create_blog, __path_delete_blog, __path_flush_draft,
    __path_get_blog_for_edit, __path_get_draft_status, __path_get_published,
    __path_list_my_blogs, __path_list_published, __path_revise_blog, __path_submit_blog,
    __path_withdraw_blog, autosave_draft, create_blog, delete_blog, flush_draft,
    get_blog_for_edit, get_draft_status, get_published, list_my_blogs, list_published,
    revise_blog, submit_blog, withdraw_blog, BlogState,
};
pub use review_handler::{
    __path_approve_blog, __path_list_review_queue, __path_publish_blog, __path_reject_blog,
    __path_unpublish_blog, approve_blog, list_review_queue, publish_blog, reject_blog,
    unpublish_blog,
};
pub use translation_handler::{
    __path_translate_blog, __path_translate_text, translate_blog, translate_text,
};
