//! Embedding index backends.
//!
//! - [`MemoryIndex`]: exact cosine scan over an in-memory snapshot (JSON on disk).
//! - [`LanceIndex`]: read side of a persisted LanceDB chunk table.
//! - [`LanceIndexWriter`]: builds that table from chunks and embeddings.

pub mod lance;
pub mod memory;
pub mod schema;
pub mod table;
pub mod writer;

pub use lance::LanceIndex;
pub use memory::MemoryIndex;
pub use writer::LanceIndexWriter;
