//! Keyword-overlap scoring for the fallback pass

use fair_domain::EvidenceItem;
use std::collections::BTreeSet;

/// Number of query terms the item carries as keywords
///
/// `query_terms` should come from `fair_domain::text::terms` so both sides
/// are lowercased and plural-folded the same way.
pub fn keyword_overlap(query_terms: &BTreeSet<String>, item: &EvidenceItem) -> usize {
    query_terms
        .iter()
        .filter(|term| item.has_keyword(term))
        .count()
}
