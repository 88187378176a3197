// Model exports
pub mod domain;
pub mod notification;

pub use domain::{CandidateRecord, Swatches, SearchResponse, MatchCriteria};
pub use notification::{Mailbox, Notification, DeliveryStatus};
