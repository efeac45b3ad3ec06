pub mod file_dto;

pub use file_dto::{
    extension_for, validate_upload, DeleteFileByUrlDto, DeleteFileResponseDto, FilePurpose,
    FileResponseDto, UploadFileDto, MAX_FILE_SIZE,
};
