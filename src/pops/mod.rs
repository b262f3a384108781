//! Population hierarchy handling.

pub mod hierarchy;
