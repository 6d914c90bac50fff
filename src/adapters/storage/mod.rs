//! Storage Adapters
//!
//! Implementations of the ContextStore port for persisting conversation
//! context between turns.
//!
//! ## Available Adapters
//!
//! - **InMemoryContextStore** - Process-local map (testing/development)
//! - **FileContextStore** - One YAML file per call
//! - **PostgresContextStore** - JSONB rows in PostgreSQL
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileContextStore, InMemoryContextStore};
//!
//! let store = FileContextStore::new("./data/contexts");
//! let store = InMemoryContextStore::new();
//! ```

mod file_context_store;
mod in_memory_context_store;
mod postgres_context_store;

pub use file_context_store::FileContextStore;
pub use in_memory_context_store::InMemoryContextStore;
pub use postgres_context_store::PostgresContextStore;
