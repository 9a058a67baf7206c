//! Shared types for the ProAbono connector
//!
//! This crate holds the pieces every other connector crate needs:
//! - Credentials and connector configuration
//! - The catalog of webhook trigger tags a workflow can subscribe to

pub mod config;
pub mod triggers;

pub use config::*;
pub use triggers::*;
