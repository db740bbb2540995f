//! Query coverage of a retrieval result

use fair_domain::text::terms;
use fair_domain::RetrievalResult;

/// Fraction of the query's terms found in the retrieved evidence
///
/// A term counts as covered when any retrieved item has it as a keyword or
/// mentions it in its title or content. Returns 0 for a query without
/// meaningful terms or an empty result.
pub fn evidence_coverage(query: &str, result: &RetrievalResult) -> f64 {
    let query_terms = terms(query);
    if query_terms.is_empty() || result.is_empty() {
        return 0.0;
    }

    let evidence_terms: Vec<_> = result
        .iter()
        .map(|e| terms(&format!("{} {}", e.item.title, e.item.content)))
        .collect();

    let covered = query_terms
        .iter()
        .filter(|term| {
            result.iter().any(|e| e.item.has_keyword(term))
                || evidence_terms.iter().any(|t| t.contains(*term))
        })
        .count();

    covered as f64 / query_terms.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use fair_domain::{
        Domain, EvidenceItem, RetrievalMethod, RetrievedEvidence, SourceId, SourceOrigin,
        SourceType,
    };
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn result(content: &str) -> RetrievalResult {
        let item = EvidenceItem {
            id: SourceId::new("med_002"),
            title: "Diabetes Management Guidelines".to_string(),
            content: content.to_string(),
            domain: Domain::Medical,
            reliability: 0.95,
            publication_date: None,
            source_type: SourceType::ClinicalGuideline,
            origin: SourceOrigin::Curated,
            url: None,
            keywords: BTreeSet::new(),
            embedding: Vec::new(),
        };
        RetrievalResult {
            query: String::new(),
            domain: Domain::Medical,
            items: vec![RetrievedEvidence {
                item: Arc::new(item),
                similarity: 0.5,
                method: RetrievalMethod::Semantic,
            }],
        }
    }

    #[test]
    fn test_partial_coverage() {
        let result = result("Metformin is typically the first-line medication.");
        // diabete, metformin covered; insulin not
        let coverage = evidence_coverage("diabetes metformin insulin", &result);
        assert!((coverage - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(evidence_coverage("what is it", &result("anything")), 0.0);
        assert_eq!(
            evidence_coverage("diabetes", &RetrievalResult::empty("diabetes", Domain::Medical)),
            0.0
        );
    }
}
