use crate::core::filters::matches_criteria;
use crate::models::{CandidateRecord, MatchCriteria, SearchResponse};

/// First-match selector over a decoded search response
///
/// Holds the criteria for the whole run; they are never mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct Matcher {
    criteria: MatchCriteria,
}

impl Matcher {
    pub fn new(criteria: MatchCriteria) -> Self {
        Self { criteria }
    }

    pub fn with_default_criteria() -> Self {
        Self {
            criteria: MatchCriteria::default(),
        }
    }

    pub fn criteria(&self) -> &MatchCriteria {
        &self.criteria
    }

    /// Find the first listing that satisfies the criteria
    ///
    /// Scans in source order and stops at the first hit, so ties go to the
    /// earliest record. Returns `None` for an empty or all non-matching
    /// response.
    pub fn first_match<'a>(&self, response: &'a SearchResponse) -> Option<&'a CandidateRecord> {
        response
            .result
            .iter()
            .find(|record| matches_criteria(record, &self.criteria))
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_criteria()
    }
}
