//! CLI library components for csvsrc.

pub mod config;
pub mod logging;
pub mod render;
