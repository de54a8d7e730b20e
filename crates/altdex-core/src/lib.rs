//! Core types and trait definitions for the altdex directory.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod ad;
pub mod directory;
pub mod error;
pub mod listing;
pub mod payment;
pub mod rotation;
pub mod sponsor;
pub mod store;

pub use directory::Directory;
pub use error::{Error, Result};
