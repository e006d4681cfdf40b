use crate::entities::{prelude::*, votes};
use anyhow::Result;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use tracing::info;

/// Repository for the per-title vote counter.
pub struct VoteRepository {
    conn: DatabaseConnection,
}

impl VoteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn count_for(&self, imdb_id: &str) -> Result<Option<i64>> {
        let row = Votes::find_by_id(imdb_id).one(&self.conn).await?;
        Ok(row.map(|m| m.count))
    }

    /// Adds `delta` to the stored count, creating the row on first vote.
    /// Counts are allowed to go negative.
    pub async fn apply(&self, imdb_id: &str, delta: i64) -> Result<VoteRow> {
        let existing = Votes::find_by_id(imdb_id).one(&self.conn).await?;
        let count = existing.as_ref().map_or(delta, |m| m.count + delta);

        let active_model = votes::ActiveModel {
            imdb_id: Set(imdb_id.to_string()),
            count: Set(count),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        Votes::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(votes::Column::ImdbId)
                    .update_columns([votes::Column::Count, votes::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        info!("vote applied for {}: count now {}", imdb_id, count);

        Ok(VoteRow {
            imdb_id: imdb_id.to_string(),
            count,
            updated_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    pub async fn total_rows(&self) -> Result<u64> {
        Ok(Votes::find().count(&self.conn).await?)
    }
}

#[derive(Debug, Clone)]
pub struct VoteRow {
    pub imdb_id: String,
    pub count: i64,
    pub updated_at: String,
}
