//! Terminal output for mirror runs

pub mod console;
pub mod render;
