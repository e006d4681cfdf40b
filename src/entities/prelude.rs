pub use super::response_cache::Entity as ResponseCache;
pub use super::votes::Entity as Votes;
