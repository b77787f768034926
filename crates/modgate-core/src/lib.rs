pub mod access;
pub mod audit;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod render;
pub mod targets;
pub mod template;
pub mod types;

pub use error::{ModgateError, Result};
