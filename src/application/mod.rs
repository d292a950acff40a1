pub mod error;
pub mod repos;
pub mod sessions;
pub mod templates;
