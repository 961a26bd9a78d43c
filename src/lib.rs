pub mod common;
pub mod files;
pub mod portal;
pub mod server;
pub mod text;
pub mod ui;
pub mod utils;
