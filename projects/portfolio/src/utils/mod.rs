pub mod contact_sink;
pub mod readme_image;
