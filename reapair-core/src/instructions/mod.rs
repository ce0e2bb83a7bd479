//! Top-level module for instruction composition.
//!
//! This module provides everything between a corpus file and a finished
//! instruction sequence:
//! - The four-list sentence pool (`SentencePool`)
//! - Corpus loading and identifier lookup (`PoolLoader`)
//! - The per-pool count policy (`Distribution`)
//! - Sampling and interleaving (`compose`)

/// Sampling, slot selection and interleaving of conditionals.
///
/// Pure functions over a read-only pool and an injected random generator.
pub mod composer;

/// Per-pool counts for a request: ratios, clamping and slot capping.
pub mod distribution;

/// Identifier registry and JSON / sectioned text parsers.
pub mod loader;

/// The four categorized sentence lists.
pub mod pool;
