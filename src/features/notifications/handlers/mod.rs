pub mod notification_handler;

pub use notification_handler::{__path_password_changed, password_changed};
