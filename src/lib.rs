pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod engine;
pub mod exit;
pub mod logs;
pub mod tui;
pub mod ui;
