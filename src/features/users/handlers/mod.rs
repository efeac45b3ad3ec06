pub mod profile_handler;
pub mod writer_handler;

pub use profile_handler::{__path_get_profile, __path_update_profile, get_profile, update_profile};
pub use writer_handler::{__path_get_writer, __path_list_writers, get_writer, list_writers};
