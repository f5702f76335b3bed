//! Shared helpers for Arrow column access, logging and progress output

pub mod arrow;
pub mod logging;
