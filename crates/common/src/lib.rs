//! Common utilities and types shared across the room session crates.

#![warn(clippy::pedantic)]

/// Module for common data types
pub mod types;
