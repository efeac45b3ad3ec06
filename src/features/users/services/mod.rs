pub mod role_service;
pub mod user_profile_service;
pub mod writer_service;

pub use role_service::RoleService;
pub use user_profile_service::UserProfileService;
pub use writer_service::WriterService;
