//! Progress indicators for mirror runs

pub mod reporter;
