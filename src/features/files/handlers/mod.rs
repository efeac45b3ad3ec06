pub mod file_handler;

pub use file_handler::{
    __path_delete_file_by_url, __path_upload_file, delete_file_by_url, upload_file,
};
