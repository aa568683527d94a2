//! Storage errors shared by every repository trait, and the in-memory store
//! backing the service binary and the tests.

mod memory;

pub use memory::MemoryStore;

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
