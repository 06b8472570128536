pub mod admin;
pub mod photos;
