pub mod auth_cmd;
pub mod common;
pub mod feed;
pub mod like;
pub mod profile;
