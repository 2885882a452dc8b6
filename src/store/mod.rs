pub mod memory;
pub mod realtime;

use async_trait::async_trait;
use thiserror::Error;

use crate::record::SubmissionRecord;

pub use memory::MemoryStore;
pub use realtime::{RealtimeDbOptions, RealtimeDbStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("no submission with id '{id}'")]
    NotFound { id: String },

    #[error("invalid submission id '{id}'")]
    InvalidKey { id: String },

    #[error("failed to set up store client: {reason}")]
    ClientSetup { reason: String },

    #[error("malformed collection snapshot: {source}")]
    MalformedSnapshot {
        #[source]
        source: serde_json::Error,
    },
}

/// A remote collection of submission records.
///
/// Every operation either succeeds or fails as a whole.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records, newest first (see [`crate::record::sort_newest_first`]).
    async fn fetch_all(&self) -> Result<Vec<SubmissionRecord>, StoreError>;

    async fn delete_one(&self, id: &str) -> Result<(), StoreError>;

    async fn delete_all(&self) -> Result<(), StoreError>;
}

/// Rejects ids the store would refuse as keys, before any request is made.
pub fn validate_key(id: &str) -> Result<(), StoreError> {
    let bad = id.trim().is_empty()
        || id
            .chars()
            .any(|c| matches!(c, '.' | '$' | '#' | '[' | ']' | '/') || c.is_control());
    if bad {
        return Err(StoreError::InvalidKey { id: id.to_string() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_key;

    #[test]
    fn generated_push_ids_are_valid_keys() {
        assert!(validate_key("-NxY3kPq_9aBcD").is_ok());
    }

    #[test]
    fn forbidden_key_characters_are_rejected() {
        for id in ["", "  ", "a.b", "a/b", "a$b", "a#b", "a[0]", "a\nb"] {
            assert!(validate_key(id).is_err(), "{id:?} should be rejected");
        }
    }
}
