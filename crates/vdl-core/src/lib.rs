pub mod config;
pub mod logging;

pub mod adapters;
pub mod attempt;
pub mod classify;
pub mod http;
pub mod job;
pub mod metadata;
pub mod orchestrator;
pub mod proxy;
pub mod source_url;
pub mod strategy;
pub mod workspace;
