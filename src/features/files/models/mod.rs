pub mod file;

pub use file::{File, FILE_COLUMNS};
