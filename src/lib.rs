pub mod config;
pub mod constants;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod types;
pub mod utils;
pub mod validations;
