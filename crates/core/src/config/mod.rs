//! Configuration loading and schema definitions
//!
//! Shared configuration types for the search engine and its front ends.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
