pub mod services;

pub use services::{store_profile_image, UploadedFile};
