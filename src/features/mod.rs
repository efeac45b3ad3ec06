pub mod admin;
pub mod auth;
pub mod blogs;
pub mod categories;
pub mod comments;
pub mod dashboard;
pub mod events;
pub mod files;
pub mod logto;
pub mod notifications;
pub mod users;
