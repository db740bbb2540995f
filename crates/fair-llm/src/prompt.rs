//! Evidence-grounded prompt construction

use fair_domain::{Domain, RetrievalResult};

/// Characters of each source's content shown to the model
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 400;

/// Text used when retrieval found nothing
pub const NO_EVIDENCE_TEXT: &str = "No specific evidence sources available for this query.";

/// Builds generation prompts that list retrieved evidence and ask for
/// `[Source N]` citations
#[derive(Debug, Clone)]
pub struct EvidencePromptBuilder {
    max_content_chars: usize,
}

impl Default for EvidencePromptBuilder {
    fn default() -> Self {
        Self {
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
        }
    }
}

impl EvidencePromptBuilder {
    /// Builder truncating source content to `max_content_chars`
    pub fn new(max_content_chars: usize) -> Self {
        Self { max_content_chars }
    }

    /// Full prompt for `query`
    pub fn build(&self, query: &str, domain: Domain, evidence: &RetrievalResult) -> String {
        format!(
            "{}\n\n{}\nQuestion: {}\n\nAnswer:",
            system_preamble(domain),
            self.evidence_block(evidence),
            query.trim()
        )
    }

    /// The numbered evidence listing with citation instructions
    pub fn evidence_block(&self, evidence: &RetrievalResult) -> String {
        if evidence.is_empty() {
            return NO_EVIDENCE_TEXT.to_string();
        }

        let mut block = String::from("=== EVIDENCE SOURCES ===\n\n");
        for (idx, entry) in evidence.iter().enumerate() {
            let item = &entry.item;
            block.push_str(&format!("[Source {}] {}\n", idx + 1, item.title));
            block.push_str(&format!("Type: {}\n", item.source_type.label()));
            block.push_str(&format!("Reliability: {:.0}%\n", item.reliability * 100.0));
            block.push_str(&format!("Content: {}\n", truncate(&item.content, self.max_content_chars)));
            if let Some(url) = &item.url {
                block.push_str(&format!("URL: {url}\n"));
            }
            block.push('\n');
        }

        block.push_str("=== CITATION INSTRUCTIONS ===\n");
        block.push_str("You MUST cite these sources in your response using [Source X] format.\n");
        block.push_str("Example: 'Low-dose aspirin reduces cardiovascular risk [Source 1].'\n");
        block
    }
}

fn system_preamble(domain: Domain) -> &'static str {
    match domain {
        Domain::Finance => {
            "You are a careful financial information assistant. Explain concepts accurately, \
             state risks plainly, and never promise returns."
        }
        Domain::Medical => {
            "You are a careful medical information assistant. Give general, evidence-based \
             information, flag warning signs, and never diagnose."
        }
        Domain::General => {
            "You are a careful assistant. Answer only from the evidence provided and say so \
             when it is insufficient."
        }
    }
}

/// At most `max` characters, with "..." when cut
fn truncate(content: &str, max: usize) -> String {
    if content.chars().count() <= max {
        return content.to_string();
    }
    let cut: String = content.chars().take(max).collect();
    format!("{cut}...")
}
