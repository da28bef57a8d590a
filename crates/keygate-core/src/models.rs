//! Domain models for keygate.
//!
//! These are the core types shared across all crates.

pub mod category;
pub mod limits;
pub mod patch;
pub mod permission;
pub mod principal;
