mod memory;

pub use memory::{InMemoryStore, SnapshotError, StoreSnapshot};

/// Error enumeration for storage collaborator failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Groups several store calls into one logical unit of work.
///
/// Implementations commit every write made by `work` when it returns `Ok` and discard all of
/// them when it returns `Err`. Other callers never observe a unit of work half applied.
pub trait Transactional {
    fn transaction<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Self) -> Result<T, StoreError>,
        Self: Sized;
}
