pub mod api;
pub mod cli;
pub mod config;
pub mod eth;
pub mod indexer;
pub mod models;
