pub mod admin_handlers;
pub mod change_feed_handler;

pub use admin_handlers::{
    __path_create_user, __path_delete_user, __path_list_users, __path_update_user_role,
    create_user, delete_user, list_users, update_user_role,
};
pub use change_feed_handler::{__path_stream_changes, stream_changes};
