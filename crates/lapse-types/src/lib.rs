//! Shared domain types for the Lapse timeline viewer.

pub mod capture;
pub mod config;
pub mod events;

mod errors;

pub use errors::{LapseError, Result};
