//! Custom request extractors.

pub mod image;

pub use image::{ImageUpload, MULTIPART_OVERHEAD};
