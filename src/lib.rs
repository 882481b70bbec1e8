pub mod api;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod maintenance;
pub mod models;
pub mod platform;
pub mod rate_limit;
pub mod ui;
