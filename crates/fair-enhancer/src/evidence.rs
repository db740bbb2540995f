//! Evidence citations
//!
//! An item counts as cited when the draft carries its `[Source N]` marker
//! (N is the 1-based rank in the retrieval result) or shares enough of its
//! keywords. Each cited item contributes `reliability / expected_sources` of
//! the evidence maximum, and the total is capped at that maximum.

use crate::config::{CitationStyle, EnhancerConfig};
use fair_domain::text::terms;
use fair_domain::{EnhancementKind, EnhancementOutcome, EvidenceItem, RetrievalResult, RetrievedEvidence};
use std::collections::BTreeSet;

/// A retrieved item the draft actually uses
#[derive(Debug, Clone, Copy)]
pub struct Cited<'a> {
    /// 1-based rank in the retrieval result
    pub rank: usize,
    /// The retrieved entry
    pub evidence: &'a RetrievedEvidence,
}

/// Retrieved items cited by `draft`, in rank order
pub fn cited_evidence<'a>(
    draft: &str,
    result: &'a RetrievalResult,
    min_keyword_overlap: usize,
) -> Vec<Cited<'a>> {
    let draft_terms = terms(draft);
    result
        .iter()
        .enumerate()
        .map(|(idx, evidence)| Cited {
            rank: idx + 1,
            evidence,
        })
        .filter(|c| is_cited(draft, &draft_terms, c.rank, &c.evidence.item, min_keyword_overlap))
        .collect()
}

fn is_cited(
    draft: &str,
    draft_terms: &BTreeSet<String>,
    rank: usize,
    item: &EvidenceItem,
    min_keyword_overlap: usize,
) -> bool {
    if draft.contains(&format!("[Source {rank}]")) {
        return true;
    }
    item.keywords.intersection(draft_terms).count() >= min_keyword_overlap
}

/// Accumulated contribution of sources with the given reliabilities
pub fn reliability_boost(
    reliabilities: impl IntoIterator<Item = f64>,
    expected_sources: f64,
    max: f64,
) -> f64 {
    let total: f64 = reliabilities
        .into_iter()
        .filter(|r| r.is_finite() && *r > 0.0)
        .map(|r| r / expected_sources * max)
        .sum();
    total.min(max)
}

/// Cite the evidence the draft uses and append a "Sources" section
pub fn enhance(draft: &str, result: &RetrievalResult, config: &EnhancerConfig) -> EnhancementOutcome {
    let cited = cited_evidence(draft, result, config.min_keyword_overlap);
    if cited.is_empty() {
        return EnhancementOutcome::not_applied(EnhancementKind::Evidence);
    }

    let boost = reliability_boost(
        cited.iter().map(|c| c.evidence.item.reliability),
        config.expected_sources,
        config.boost_limits.evidence,
    );
    // Sources with no reliability back nothing
    if boost <= 0.0 {
        return EnhancementOutcome::not_applied(EnhancementKind::Evidence);
    }

    let mut fragment = String::from("**Sources:**\n");
    for c in &cited {
        fragment.push_str(&format_citation(c.rank, &c.evidence.item, config.citation_style));
        fragment.push('\n');
    }

    EnhancementOutcome::applied(EnhancementKind::Evidence, boost, fragment.trim_end())
}

/// One line of the "Sources" section
pub fn format_citation(rank: usize, item: &EvidenceItem, style: CitationStyle) -> String {
    let date = item
        .publication_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "n.d.".to_string());
    let kind = title_case(item.source_type.label());

    match style {
        CitationStyle::Simple => format!("[{rank}] {}", item.title),
        CitationStyle::Apa => {
            let url = item
                .url
                .as_deref()
                .map(|u| format!(" Retrieved from {u}"))
                .unwrap_or_default();
            format!("[{rank}] {}. ({date}). {kind}.{url}", item.title)
        }
        CitationStyle::Mla => {
            let url = item.url.as_deref().map(|u| format!(" Web. {u}")).unwrap_or_default();
            format!("[{rank}] \"{}.\" {kind}, {date}.{url}", item.title)
        }
        CitationStyle::Chicago => {
            let url = item.url.as_deref().map(|u| format!(" {u}")).unwrap_or_default();
            format!("[{rank}] \"{},\" {kind}, {date}.{url}", item.title)
        }
    }
}

/// First sentence of `content`, or its first words followed by "..."
pub fn snippet(content: &str, max_len: usize) -> String {
    let content = content.trim();
    let first = content.split(". ").next().unwrap_or(content).trim_end_matches('.');
    if first.chars().count() <= max_len {
        return format!("{first}.");
    }

    let budget = max_len.saturating_sub(3);
    let mut out = String::new();
    for word in first.split_whitespace() {
        let extra = if out.is_empty() { 0 } else { 1 };
        if out.chars().count() + extra + word.chars().count() > budget {
            break;
        }
        if extra == 1 {
            out.push(' ');
        }
        out.push_str(word);
    }
    format!("{out}...")
}

fn title_case(label: &str) -> String {
    label
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
