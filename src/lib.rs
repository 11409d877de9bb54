pub mod config;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod scheduler;
pub mod services;
