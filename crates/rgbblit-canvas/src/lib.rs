pub mod error;
pub mod image_file;
pub mod target;
