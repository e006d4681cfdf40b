use thiserror::Error;
use tracing::info;

use crate::db::{Store, VoteRow};

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("vote must be 1 or -1, got {0}")]
    InvalidDirection(i64),

    #[error("imdbid must not be blank")]
    MissingId,

    #[error("Database error: {0}")]
    Database(String),
}

/// Vote casting and reading on top of the vote store.
#[derive(Clone)]
pub struct VoteService {
    store: Store,
}

impl VoteService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Applies a single up or down vote. The first vote for a title creates
    /// its counter; counts may go negative.
    pub async fn cast(&self, imdb_id: &str, direction: i64) -> Result<VoteRow, VoteError> {
        if imdb_id.trim().is_empty() {
            return Err(VoteError::MissingId);
        }
        if direction != 1 && direction != -1 {
            return Err(VoteError::InvalidDirection(direction));
        }

        let row = self
            .store
            .apply_vote(imdb_id, direction)
            .await
            .map_err(|e| VoteError::Database(e.to_string()))?;

        info!("vote cast for {}: {:+}", imdb_id, direction);
        Ok(row)
    }

    pub async fn count_for(&self, imdb_id: &str) -> Result<i64, VoteError> {
        self.store
            .vote_count_for(imdb_id)
            .await
            .map(|count| count.unwrap_or(0))
            .map_err(|e| VoteError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> Store {
        Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .expect("in-memory store")
    }

    #[tokio::test]
    async fn test_first_vote_creates_counter() {
        let votes = VoteService::new(memory_store().await);

        assert_eq!(votes.count_for("tt0454349").await.unwrap(), 0);

        let row = votes.cast("tt0454349", 1).await.unwrap();
        assert_eq!(row.count, 1);

        votes.cast("tt0454349", 1).await.unwrap();
        let row = votes.cast("tt0454349", 1).await.unwrap();
        assert_eq!(row.count, 3);
    }

    #[tokio::test]
    async fn test_votes_can_go_negative() {
        let votes = VoteService::new(memory_store().await);

        votes.cast("tt0454349", -1).await.unwrap();
        let row = votes.cast("tt0454349", -1).await.unwrap();
        assert_eq!(row.count, -2);
    }

    #[tokio::test]
    async fn test_rejects_invalid_direction() {
        let votes = VoteService::new(memory_store().await);

        assert!(matches!(
            votes.cast("tt0454349", 2).await,
            Err(VoteError::InvalidDirection(2))
        ));
        assert!(matches!(
            votes.cast("  ", 1).await,
            Err(VoteError::MissingId)
        ));
    }
}
