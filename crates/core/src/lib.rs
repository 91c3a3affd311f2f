//! Core utilities for the Birch recipe search pipeline
//!
//! This crate provides shared functionality used by the search engine and its
//! front ends:
//!
//! - **Error handling**: Errors with codes, context, and recovery suggestions
//! - **Caching**: Bounded in-memory cache with time-to-live expiry
//! - **Configuration**: TOML-based configuration with defaults per field
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use birch_core::cache::{CacheConfig, TtlCache};
//!
//! let cache: TtlCache<String> = TtlCache::new(CacheConfig {
//!     ttl: Duration::from_secs(300),
//!     max_entries: 100,
//! });
//!
//! cache.insert("gin", "Gin & Tonic".to_string());
//! assert_eq!(cache.get("gin").as_deref(), Some("Gin & Tonic"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod error;

pub use error::{Error, ErrorCode, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{CacheConfig, CacheStats, TtlCache};
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result};
}
