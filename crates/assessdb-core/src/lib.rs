//! Shared foundation of the assessment recommender.
//!
//! Domain types, the `Embedder`/`EmbeddingIndex` seams, the error enum,
//! Figment-backed configuration, catalog chunking and ground-truth records.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod ground_truth;
pub mod similarity;
pub mod traits;
pub mod types;
