//! Configuration types for Lingo.
//!
//! This crate provides the configuration used to locate translation
//! catalogs and tune lookups, read from `.lingo/config.yaml` files.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;
