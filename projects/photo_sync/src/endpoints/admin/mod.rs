pub mod add_photos;
pub mod poll;
