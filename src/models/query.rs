use serde::Deserialize;

/// Incoming search parameters: a free-text title search, a direct IMDb-style
/// identifier lookup, or both (upstream gives the identifier precedence).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieQuery {
    pub imdb_id: Option<String>,
    pub page: Option<u32>,
    pub search: Option<String>,
}

impl MovieQuery {
    #[must_use]
    pub fn by_title(term: &str, page: Option<u32>) -> Self {
        Self {
            imdb_id: None,
            page,
            search: Some(term.to_string()),
        }
    }

    #[must_use]
    pub fn by_id(imdb_id: &str) -> Self {
        Self {
            imdb_id: Some(imdb_id.to_string()),
            page: None,
            search: None,
        }
    }

    /// Serializes the parameters into a URL-encoded string with a stable key
    /// order (`i`, `page`, `s`). Used verbatim both as the upstream query
    /// string and as the cache key, so it must be deterministic.
    #[must_use]
    pub fn canonical(&self) -> String {
        let mut parts = Vec::new();

        if let Some(id) = &self.imdb_id {
            parts.push(format!("i={}", urlencoding::encode(id)));
        }
        if let Some(page) = self.page {
            parts.push(format!("page={page}"));
        }
        if let Some(term) = &self.search {
            parts.push(format!("s={}", urlencoding::encode(term)));
        }

        parts.join("&")
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.imdb_id.is_none() && self.search.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_is_order_stable() {
        let query = MovieQuery {
            search: Some("thomas".to_string()),
            page: Some(2),
            imdb_id: None,
        };
        assert_eq!(query.canonical(), "page=2&s=thomas");
    }

    #[test]
    fn test_canonical_encodes_values() {
        let query = MovieQuery::by_title("the good, the bad", None);
        assert_eq!(query.canonical(), "s=the%20good%2C%20the%20bad");
    }

    #[test]
    fn test_canonical_lookup() {
        let query = MovieQuery::by_id("tt3896198");
        assert_eq!(query.canonical(), "i=tt3896198");
    }

    #[test]
    fn test_empty_query() {
        assert!(MovieQuery::default().is_empty());
        assert!(!MovieQuery::by_id("tt0454349").is_empty());
    }
}
