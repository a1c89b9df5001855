pub mod app;
pub mod auth;
pub mod billing;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod form;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod table;
pub mod templates;
pub mod types;
