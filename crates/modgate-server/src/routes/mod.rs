pub mod actions;
pub mod status;
pub mod targets;
pub mod templates;
