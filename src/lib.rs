pub mod app;
pub mod cli;
pub mod commands;
pub mod constants;
pub mod errors;
pub mod models;
pub mod services;
pub mod stores;
pub mod utils;
