pub mod analyzers;
pub mod clustering;
pub mod commands;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod parsers;
pub mod types;
