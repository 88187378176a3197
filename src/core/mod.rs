// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod poller;

pub use filters::matches_criteria;
pub use matcher::Matcher;
pub use poller::{MatchReport, PollError, PollOutcome, Poller, DEFAULT_POLL_INTERVAL};
