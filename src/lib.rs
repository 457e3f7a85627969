// src/lib.rs
pub mod api;
pub mod auth;
pub mod classifier;
pub mod config;
pub mod database;
pub mod errors;
pub mod executor;
pub mod judge;
pub mod models;
pub mod stats;
pub mod templates;
