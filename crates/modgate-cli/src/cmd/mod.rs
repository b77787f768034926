pub mod config;
pub mod exec;
pub mod serve;
pub mod status;
pub mod targets;
