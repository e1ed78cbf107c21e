//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, these traits abstract the collaborators
//! the spread monitor consumes:
//! - Price history per instrument (files, generators, vendors)

pub mod price_source;

pub use price_source::{PriceSource, PriceSourceError};
