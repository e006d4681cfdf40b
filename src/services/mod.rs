pub mod enricher;
pub use enricher::SearchEnricher;

pub mod votes;
pub use votes::{VoteError, VoteService};
