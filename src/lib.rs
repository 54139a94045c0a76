pub mod commands;
pub mod config;
pub mod crud;
pub mod flower;
pub mod hint;
pub mod images;
pub mod palette;
pub mod scoring;
pub mod select;
pub mod session;
pub mod stats;
pub mod tui;
pub mod utils;
