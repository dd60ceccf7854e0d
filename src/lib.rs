pub mod api_connection;
pub mod cli;
pub mod config;
pub mod error;
pub mod images;
pub mod models;
pub mod orchestrator;
pub mod response_parser;
pub mod store;
