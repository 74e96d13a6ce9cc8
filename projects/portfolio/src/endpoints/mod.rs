pub mod contact;
pub mod github;
