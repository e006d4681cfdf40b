use serde::Serialize;

use crate::db::VoteRow;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoteDto {
    pub imdb_id: String,
    pub count: i64,
    pub updated_at: String,
}

impl From<VoteRow> for VoteDto {
    fn from(row: VoteRow) -> Self {
        Self {
            imdb_id: row.imdb_id,
            count: row.count,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub vote_rows: u64,
    pub cached_responses: u64,
}
