pub mod config;
pub mod dataset;
pub mod rule_builder;
pub mod scheduler;
pub mod source;
