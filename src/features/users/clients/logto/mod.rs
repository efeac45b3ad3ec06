pub mod users;

pub use users::{IdentityDirectory, LogtoUserClient, NewIdentity};
