use crate::models::{CandidateRecord, MatchCriteria};

/// Check if a listing satisfies every criteria field
///
/// Comparison is exact and case-sensitive, no trimming or normalization.
#[inline]
pub fn matches_criteria(record: &CandidateRecord, criteria: &MatchCriteria) -> bool {
    record.in_stock == criteria.availability
        && record.keh_coverage == criteria.coverage
        && record.keh_mount == criteria.mount
}
