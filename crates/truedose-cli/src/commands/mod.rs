pub mod bookmarks;
pub mod config;
pub mod history;
pub mod play;
pub mod profile;
pub mod subscription;
