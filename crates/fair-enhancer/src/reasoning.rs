//! Enumerated reasoning structure
//!
//! Drafts without visible structure are rebuilt as Problem, Key facts,
//! Analysis, Caveats and Conclusion. The analysis lead and closing lines come
//! from a template picked by domain and query topic.

use crate::config::EnhancerConfig;
use crate::evidence::{snippet, Cited};
use fair_domain::{Domain, EnhancementKind, EnhancementOutcome};

/// Section labels, in output order
pub const SECTION_LABELS: [&str; 5] = ["problem", "key facts", "analysis", "caveats", "conclusion"];

/// Labels or numbered steps needed before a draft counts as structured
const STRUCTURE_MIN_MARKERS: usize = 3;

/// Domain- and topic-specific wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReasoningTemplate {
    /// Topic name, for logs
    pub topic: &'static str,
    /// First line of the analysis section
    pub lead: &'static str,
    /// Caveats section
    pub caveat: &'static str,
    /// Conclusion section
    pub conclusion: &'static str,
}

const FINANCE_COMPARISON: ReasoningTemplate = ReasoningTemplate {
    topic: "comparison",
    lead: "Comparing the options means weighing potential returns against the cost of debt, then risk, liquidity, and tax effects.",
    caveat: "Returns are not guaranteed, and the trade-off depends on your rates, timeline, and tolerance for risk.",
    conclusion: "The better choice depends on your specific goals; run both scenarios with your own numbers.",
};

const FINANCE_INVESTMENT: ReasoningTemplate = ReasoningTemplate {
    topic: "investment",
    lead: "Evaluating an investment starts with risk tolerance and time horizon, then diversification and expected volatility.",
    caveat: "Past performance does not predict future results, and any investment can lose value.",
    conclusion: "Match the investment to your horizon and risk tolerance, and review it with a licensed advisor.",
};

const FINANCE_RETIREMENT: ReasoningTemplate = ReasoningTemplate {
    topic: "retirement",
    lead: "Retirement planning starts from the current financial situation, estimated savings needs, and the available account types.",
    caveat: "Contribution limits and tax rules change, and projections rely on assumed returns.",
    conclusion: "Start early, use tax-advantaged accounts, and revisit the plan as circumstances change.",
};

const FINANCE_DEBT: ReasoningTemplate = ReasoningTemplate {
    topic: "debt",
    lead: "Managing debt starts with the type and terms of each balance, then repayment strategy and the effect on credit.",
    caveat: "Interest rates, fees, and penalties differ by lender and can change the best order of repayment.",
    conclusion: "Prioritize high-interest balances, and consider professional credit counseling for complex situations.",
};

const FINANCE_GENERAL: ReasoningTemplate = ReasoningTemplate {
    topic: "general",
    lead: "The relevant financial background and the key factors that apply are considered below.",
    caveat: "Individual circumstances vary, and general information is not a substitute for personal advice.",
    conclusion: "Use this as a starting point and confirm the details with a qualified financial professional.",
};

const MEDICAL_SYMPTOM: ReasoningTemplate = ReasoningTemplate {
    topic: "symptom",
    lead: "Assessing symptoms means considering common causes first, then red flags and individual risk factors.",
    caveat: "Symptoms overlap between conditions, and only an examination can rule out serious causes.",
    conclusion: "Seek professional evaluation, and get urgent care if symptoms are severe or worsening.",
};

const MEDICAL_MEDICATION: ReasoningTemplate = ReasoningTemplate {
    topic: "medication",
    lead: "Understanding a medication covers how it works, its typical uses, side effects, and interactions.",
    caveat: "Dosing and suitability depend on your history and other medications.",
    conclusion: "Take medications only as prescribed and discuss changes with your doctor or pharmacist.",
};

const MEDICAL_DIAGNOSIS: ReasoningTemplate = ReasoningTemplate {
    topic: "diagnosis",
    lead: "Understanding a condition covers what it involves, its common signs, and typical treatment approaches.",
    caveat: "A proper diagnosis requires clinical assessment and appropriate testing.",
    conclusion: "Work with a healthcare professional to confirm the diagnosis and choose a treatment plan.",
};

const MEDICAL_GENERAL: ReasoningTemplate = ReasoningTemplate {
    topic: "general",
    lead: "The general background, the relevant factors, and the evidence-based guidance are considered below.",
    caveat: "General information cannot account for your individual medical history.",
    conclusion: "Consult a healthcare professional before acting on this information.",
};

const GENERAL: ReasoningTemplate = ReasoningTemplate {
    topic: "general",
    lead: "The question is broken down into the relevant facts and how they apply.",
    caveat: "This answer draws on limited sources and may not cover every case.",
    conclusion: "Verify important details against authoritative sources.",
};

/// Template for `domain`, chosen by the topic words in `query`
pub fn select_template(domain: Domain, query: &str) -> ReasoningTemplate {
    let q = format!(" {} ", query.to_lowercase());
    let has = |words: &[&str]| words.iter().any(|w| q.contains(w));

    match domain {
        Domain::Finance => {
            let comparison = has(&[" or ", " vs ", "versus", "compare", "difference", "better"]);
            let invest = has(&["invest", "portfolio", "stock", "fund"]);
            let debt = has(&["debt", "loan", "credit", "mortgage"]);
            let retirement = has(&["retire", "saving", "pension", "401k", "401(k)"]);

            if comparison && invest && (debt || retirement) {
                FINANCE_COMPARISON
            } else if invest {
                FINANCE_INVESTMENT
            } else if retirement {
                FINANCE_RETIREMENT
            } else if debt {
                FINANCE_DEBT
            } else {
                FINANCE_GENERAL
            }
        }
        Domain::Medical => {
            if has(&["symptom", "pain", "feeling", "hurt"]) {
                MEDICAL_SYMPTOM
            } else if has(&["medication", "drug", "treatment", "medicine", "dose", "dosage"]) {
                MEDICAL_MEDICATION
            } else if has(&["diagnos", "condition", "disease"]) {
                MEDICAL_DIAGNOSIS
            } else {
                MEDICAL_GENERAL
            }
        }
        Domain::General => GENERAL,
    }
}

/// True when the draft already carries enough section labels or numbered steps
pub fn has_structure(draft: &str) -> bool {
    let mut labels = [false; SECTION_LABELS.len()];
    let mut steps = 0;

    for line in draft.lines() {
        let line = line.trim_start();
        if is_numbered_step(line) {
            steps += 1;
        }
        let bare = line
            .trim_start_matches(|c: char| c == '#' || c == '*' || c.is_whitespace())
            .to_lowercase();
        for (seen, label) in labels.iter_mut().zip(SECTION_LABELS) {
            if bare.starts_with(label) {
                *seen = true;
            }
        }
    }

    let label_count = labels.iter().filter(|seen| **seen).count();
    label_count >= STRUCTURE_MIN_MARKERS || steps >= STRUCTURE_MIN_MARKERS
}

/// `1.`, `2)` or `Step 3` at the start of a line
fn is_numbered_step(line: &str) -> bool {
    let lower = line.to_lowercase();
    let rest = lower.strip_prefix("step ").unwrap_or(&lower);
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return false;
    }
    lower.starts_with("step ") || matches!(rest[digits..].chars().next(), Some('.') | Some(')'))
}

/// Rebuild the draft as an enumerated reasoning structure
///
/// Not applied, with zero boost, when the draft is already structured.
pub fn enhance(
    draft: &str,
    query: &str,
    domain: Domain,
    cited: &[Cited<'_>],
    config: &EnhancerConfig,
) -> EnhancementOutcome {
    if has_structure(draft) {
        return EnhancementOutcome::not_applied(EnhancementKind::Reasoning);
    }

    let template = select_template(domain, query);
    let mut text = format!("**Problem:** {}\n\n**Key facts:**\n", query.trim());
    if cited.is_empty() {
        text.push_str("- No retrieved source addresses this directly.\n");
    }
    for c in cited {
        text.push_str(&format!(
            "- {} [Source {}]\n",
            snippet(&c.evidence.item.content, config.snippet_max_len),
            c.rank
        ));
    }
    text.push_str(&format!(
        "\n**Analysis:** {}\n\n{}\n\n**Caveats:** {}\n\n**Conclusion:** {}",
        template.lead,
        draft.trim(),
        template.caveat,
        template.conclusion
    ));

    let boost = config
        .reasoning_boosts
        .for_domain(domain)
        .min(config.boost_limits.reasoning);
    EnhancementOutcome::applied(EnhancementKind::Reasoning, boost, text)
}
