//! History statistics.
//!
//! Derived on demand from the session history; nothing here is stored.

pub mod aggregator;

pub use aggregator::*;
