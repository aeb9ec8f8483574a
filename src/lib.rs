pub mod admin;
pub mod api;
pub mod config;
pub mod server;
pub mod telemetry;
pub mod transfer;
