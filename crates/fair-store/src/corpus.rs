//! Corpus records and import
//!
//! The maintenance path that turns raw records (curated entries, JSON or
//! JSONL files, Q&A dataset pairs) into an [`EvidenceCatalog`]. Missing
//! embeddings are computed here, so query time only ever sees complete items.

use crate::catalog::{CatalogBuild, EvidenceCatalog, SkippedItem};
use crate::embedding::EmbeddingModel;
use crate::StoreError;
use chrono::NaiveDate;
use fair_domain::text::term_sequence;
use fair_domain::{Domain, SourceOrigin, SourceType};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info, warn};

/// Maximum number of keywords extracted per item
pub const KEYWORD_LIMIT: usize = 12;

/// Minimum keyword length
const KEYWORD_MIN_LEN: usize = 4;

/// Reliability assigned to dataset-derived items
pub const DATASET_RELIABILITY: f64 = 0.75;

/// Characters of the question kept in a dataset item title
const DATASET_TITLE_CHARS: usize = 60;

/// Raw evidence record as stored in corpus files
///
/// Everything a catalog requires is optional here so that malformed records
/// can be parsed, reported and skipped rather than failing a whole file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRecord {
    /// Stable source id
    #[serde(default)]
    pub id: String,
    /// Short title
    #[serde(default)]
    pub title: String,
    /// Free-text content
    #[serde(default)]
    pub content: String,
    /// `finance` or `medical`
    #[serde(default)]
    pub domain: Option<String>,
    /// Reliability in [0, 1]
    #[serde(default, alias = "reliability_score")]
    pub reliability: Option<f64>,
    /// Publication date (`YYYY-MM-DD`)
    #[serde(default)]
    pub publication_date: Option<NaiveDate>,
    /// Publication kind
    #[serde(default = "default_source_type")]
    pub source_type: SourceType,
    /// Curated or dataset-derived
    #[serde(default = "default_origin")]
    pub origin: SourceOrigin,
    /// Link to the original
    #[serde(default)]
    pub url: Option<String>,
    /// Keywords; extracted from title and content when empty
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Precomputed embedding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

fn default_source_type() -> SourceType {
    SourceType::Other
}

fn default_origin() -> SourceOrigin {
    SourceOrigin::Curated
}

/// A question/answer pair from an imported dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaPair {
    /// Question text
    #[serde(default)]
    pub question: String,
    /// Answer text
    #[serde(default)]
    pub answer: String,
}

/// Records decoded from a corpus file, plus the entries that could not be
#[derive(Debug, Default)]
pub struct ParsedCorpus {
    /// Decoded records, in file order
    pub records: Vec<CorpusRecord>,
    /// Entries that were not valid records
    pub skipped: Vec<SkippedItem>,
}

impl ParsedCorpus {
    /// Number of decoded records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing was decoded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse records from a JSON array or from JSON lines
///
/// An entry that does not decode as a record is skipped and logged; only a
/// JSON array document that is not valid JSON fails as a whole.
pub fn parse_records(input: &str) -> Result<ParsedCorpus, StoreError> {
    let (records, skipped) = parse_json_or_lines(input)?;
    Ok(ParsedCorpus { records, skipped })
}

/// Read records from a `.json` or `.jsonl` file
pub fn load_records(path: impl AsRef<Path>) -> Result<ParsedCorpus, StoreError> {
    let input = std::fs::read_to_string(path.as_ref())?;
    let parsed = parse_records(&input)?;
    info!(
        path = %path.as_ref().display(),
        records = parsed.records.len(),
        skipped = parsed.skipped.len(),
        "Loaded corpus records"
    );
    Ok(parsed)
}

/// Turn a Q&A dataset (JSON array or lines of `{question, answer}`) into records
///
/// Pairs with an empty question or answer are dropped; entries that are not
/// pairs at all are reported as skipped.
pub fn parse_qa_dataset(input: &str, domain: Domain) -> Result<ParsedCorpus, StoreError> {
    let (pairs, skipped) = parse_json_or_lines::<QaPair>(input)?;
    let records: Vec<CorpusRecord> = pairs
        .iter()
        .filter(|p| !p.question.trim().is_empty() && !p.answer.trim().is_empty())
        .enumerate()
        .map(|(index, pair)| dataset_record(domain, index, &pair.question, &pair.answer))
        .collect();
    debug!(%domain, pairs = pairs.len(), records = records.len(), "Parsed Q&A dataset");
    Ok(ParsedCorpus { records, skipped })
}

fn parse_json_or_lines<T: DeserializeOwned>(
    input: &str,
) -> Result<(Vec<T>, Vec<SkippedItem>), StoreError> {
    let trimmed = input.trim_start();
    let entries: Vec<(String, Result<Value, serde_json::Error>)> = if trimmed.starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(trimmed)?;
        values
            .into_iter()
            .enumerate()
            .map(|(i, value)| (format!("<entry {}>", i + 1), Ok(value)))
            .collect()
    } else {
        trimmed
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| (format!("<line {}>", i + 1), serde_json::from_str(line)))
            .collect()
    };

    let mut decoded = Vec::new();
    let mut skipped = Vec::new();
    for (position, entry) in entries {
        let value = match entry {
            Ok(value) => value,
            Err(e) => {
                skipped.push(undecodable(position, e));
                continue;
            }
        };
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
            .map(str::to_string)
            .unwrap_or(position);
        match serde_json::from_value::<T>(value) {
            Ok(item) => decoded.push(item),
            Err(e) => skipped.push(undecodable(id, e)),
        }
    }
    Ok((decoded, skipped))
}

fn undecodable(id: String, error: serde_json::Error) -> SkippedItem {
    let skip = SkippedItem {
        id,
        reason: format!("invalid JSON: {error}"),
    };
    warn!(source_id = %skip.id, reason = %skip.reason, "Skipping undecodable corpus entry");
    skip
}

/// Build a dataset-derived record
///
/// Ids are `dataset_fin_NNNN` / `dataset_med_NNNN`; the title carries the
/// start of the question and the content holds the full pair.
pub fn dataset_record(domain: Domain, index: usize, question: &str, answer: &str) -> CorpusRecord {
    let (prefix, label) = match domain {
        Domain::Medical => ("dataset_med", "Medical Q&A"),
        _ => ("dataset_fin", "Finance Q&A"),
    };
    let domain = if domain == Domain::Medical {
        Domain::Medical
    } else {
        Domain::Finance
    };

    let question = question.trim();
    let short: String = question.chars().take(DATASET_TITLE_CHARS).collect();
    let title = if short.len() < question.len() {
        format!("{label}: {short}...")
    } else {
        format!("{label}: {short}")
    };

    CorpusRecord {
        id: format!("{prefix}_{index:04}"),
        title,
        content: format!("Q: {}\n\nA: {}", question, answer.trim()),
        domain: Some(domain.as_str().to_string()),
        reliability: Some(DATASET_RELIABILITY),
        publication_date: NaiveDate::from_ymd_opt(2024, 10, 5),
        source_type: SourceType::QaDataset,
        origin: SourceOrigin::Dataset,
        url: None,
        keywords: Vec::new(),
        embedding: None,
    }
}

/// Extract up to `limit` keywords from a title and its content
///
/// Terms of at least four characters, ranked by frequency with title terms
/// counted twice; ties keep first-appearance order.
pub fn extract_keywords(title: &str, content: &str, limit: usize) -> BTreeSet<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let title_terms = term_sequence(title);
    let content_terms = term_sequence(content);

    for (position, (term, weight)) in title_terms
        .iter()
        .map(|t| (t, 2))
        .chain(content_terms.iter().map(|t| (t, 1)))
        .enumerate()
    {
        if term.chars().count() < KEYWORD_MIN_LEN {
            continue;
        }
        let entry = counts.entry(term.clone()).or_insert((0, position));
        entry.0 += weight;
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked.into_iter().take(limit).map(|(term, _)| term).collect()
}

/// Fills in embeddings for records and builds catalogs
pub struct CorpusImporter<'a> {
    model: &'a dyn EmbeddingModel,
}

impl<'a> CorpusImporter<'a> {
    /// Create an importer that embeds with `model`
    pub fn new(model: &'a dyn EmbeddingModel) -> Self {
        Self { model }
    }

    /// Compute embeddings for records that lack one
    ///
    /// The embedded text is the title followed by the content. Records with
    /// neither are left untouched and will be skipped by the catalog.
    /// Returns the number of records embedded.
    pub fn embed_missing(&self, records: &mut [CorpusRecord]) -> Result<usize, StoreError> {
        let mut embedded = 0;
        for record in records.iter_mut().filter(|r| r.embedding.is_none()) {
            let text = format!("{}\n{}", record.title, record.content);
            if text.trim().is_empty() {
                continue;
            }
            record.embedding = Some(self.model.embed(&text)?);
            embedded += 1;
        }
        Ok(embedded)
    }

    /// Embed missing vectors, then build a catalog
    pub fn build(&self, mut records: Vec<CorpusRecord>) -> Result<CatalogBuild, StoreError> {
        let embedded = self.embed_missing(&mut records)?;
        debug!(embedded, total = records.len(), "Embedded corpus records");
        Ok(EvidenceCatalog::build(self.model.dimension(), records))
    }

    /// Build a catalog from parsed corpus input
    ///
    /// Entries skipped while parsing are reported ahead of those the catalog
    /// rejects.
    pub fn import(&self, parsed: ParsedCorpus) -> Result<CatalogBuild, StoreError> {
        let ParsedCorpus {
            records,
            mut skipped,
        } = parsed;
        let mut build = self.build(records)?;
        skipped.append(&mut build.skipped);
        build.skipped = skipped;
        Ok(build)
    }
}

/// The built-in curated corpus plus any extra records, as a catalog
pub fn builtin_catalog(
    model: &dyn EmbeddingModel,
    extra: Vec<CorpusRecord>,
) -> Result<CatalogBuild, StoreError> {
    let mut records = curated_records();
    records.extend(extra);
    CorpusImporter::new(model).build(records)
}

/// Curated finance and medical evidence
pub fn curated_records() -> Vec<CorpusRecord> {
    vec![
        curated(
            "med_001",
            Domain::Medical,
            "Aspirin for Primary Prevention of Cardiovascular Disease",
            "Low-dose aspirin (75-100 mg daily) reduces the risk of major cardiovascular events in adults aged 40-70 years with elevated cardiovascular risk and low bleeding risk. The U.S. Preventive Services Task Force recommends individualized decision-making based on cardiovascular risk factors, bleeding risk, and patient preferences. Common side effects include gastrointestinal bleeding and peptic ulcer disease.",
            SourceType::ClinicalGuideline,
            "https://www.uspreventiveservicestaskforce.org/uspstf/recommendation/aspirin-use-to-prevent-cardiovascular-disease-preventive-medication",
            (2022, 4, 26),
            0.95,
        ),
        curated(
            "med_002",
            Domain::Medical,
            "Diabetes Management Guidelines",
            "Type 2 diabetes management involves lifestyle modifications including diet, exercise, and weight management, combined with pharmacological interventions when necessary. Metformin is typically the first-line medication. Regular monitoring of HbA1c, blood pressure, and lipid levels is essential. Target HbA1c is generally <7% for most adults, though individualized targets may be appropriate.",
            SourceType::ClinicalGuideline,
            "https://care.diabetesjournals.org/content/diacare/suppl/2023/12/08/47.Supplement_1.DC1/Standards_of_Care_2024.pdf",
            (2024, 1, 1),
            0.95,
        ),
        curated(
            "med_003",
            Domain::Medical,
            "Hypertension Management",
            "Hypertension is defined as systolic BP of 130 mmHg or higher or diastolic BP of 80 mmHg or higher. Initial treatment includes lifestyle modifications (DASH diet, sodium reduction, weight loss, physical activity, alcohol moderation). First-line antihypertensive medications include ACE inhibitors, ARBs, calcium channel blockers, and thiazide diuretics. Blood pressure targets are generally <130/80 mmHg for most adults.",
            SourceType::ClinicalGuideline,
            "https://www.ahajournals.org/doi/full/10.1161/HYP.0000000000000065",
            (2023, 6, 1),
            0.95,
        ),
        curated(
            "med_004",
            Domain::Medical,
            "Mental Health Crisis Intervention",
            "Individuals experiencing suicidal ideation require immediate professional evaluation. Warning signs include expressing hopelessness, social withdrawal, dramatic mood changes, and talking about death or suicide. The 988 Suicide and Crisis Lifeline provides 24/7 crisis support. Safety planning involves removing access to lethal means and establishing support networks.",
            SourceType::ClinicalGuideline,
            "https://www.nimh.nih.gov/health/topics/suicide-prevention",
            (2023, 9, 1),
            0.98,
        ),
        curated(
            "fin_001",
            Domain::Finance,
            "Portfolio Diversification Principles",
            "Modern portfolio theory demonstrates that diversification across uncorrelated assets reduces portfolio risk without proportionally reducing expected returns. The efficient frontier represents optimal risk-return combinations. Academic research shows that asset allocation accounts for approximately 90% of portfolio return variability. Geographic and sector diversification provide additional risk reduction benefits.",
            SourceType::ResearchPaper,
            "https://www.jstor.org/stable/2975974",
            (1952, 3, 1),
            0.90,
        ),
        curated(
            "fin_002",
            Domain::Finance,
            "Interest Rate and Bond Price Relationship",
            "Bond prices and interest rates have an inverse relationship due to discounted cash flow principles. When interest rates rise, existing bonds with lower coupon rates become less attractive, causing their prices to fall. Duration measures price sensitivity to interest rate changes. Longer-duration bonds experience greater price volatility from interest rate movements.",
            SourceType::Educational,
            "https://www.investopedia.com/terms/i/interest_rate_risk.asp",
            (2023, 1, 15),
            0.85,
        ),
        curated(
            "fin_003",
            Domain::Finance,
            "Cryptocurrency Market Volatility",
            "Cryptocurrency markets exhibit extreme volatility with daily price movements often exceeding 10%. Bitcoin has experienced multiple bear markets with peak-to-trough declines exceeding 80%. Regulatory uncertainty, technological risks, and market manipulation contribute to volatility. The SEC and other regulators continue developing frameworks for digital asset oversight.",
            SourceType::MarketAnalysis,
            "https://www.sec.gov/investor/alerts/ia_bitcoin.pdf",
            (2023, 12, 1),
            0.90,
        ),
        curated(
            "fin_004",
            Domain::Finance,
            "Retirement Planning Best Practices",
            "Financial advisors recommend saving 10-15% of income for retirement starting in one's 20s. The power of compound growth makes early saving crucial, since each year delayed requires significantly higher savings rates. Tax-advantaged accounts like 401(k)s and IRAs provide substantial benefits. Target-date funds offer age-appropriate asset allocation automatically.",
            SourceType::FinancialPlanning,
            "https://www.dol.gov/sites/dolgov/files/ebsa/about-ebsa/our-activities/resource-center/publications/top-10-ways-to-prepare-for-retirement.pdf",
            (2023, 8, 1),
            0.92,
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn curated(
    id: &str,
    domain: Domain,
    title: &str,
    content: &str,
    source_type: SourceType,
    url: &str,
    (year, month, day): (i32, u32, u32),
    reliability: f64,
) -> CorpusRecord {
    CorpusRecord {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        domain: Some(domain.as_str().to_string()),
        reliability: Some(reliability),
        publication_date: NaiveDate::from_ymd_opt(year, month, day),
        source_type,
        origin: SourceOrigin::Curated,
        url: Some(url.to_string()),
        keywords: Vec::new(),
        embedding: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbeddingModel;
    use fair_domain::traits::EvidenceStore;
    use fair_domain::SourceId;

    #[test]
    fn test_curated_corpus_builds_cleanly() {
        let model = HashingEmbeddingModel::default();
        let build = builtin_catalog(&model, Vec::new()).unwrap();

        assert!(build.skipped.is_empty());
        assert_eq!(build.catalog.domain_len(Domain::Finance), 4);
        assert_eq!(build.catalog.domain_len(Domain::Medical), 4);
        let crisis = build.catalog.get(&SourceId::new("med_004")).unwrap();
        assert_eq!(crisis.reliability, 0.98);
        assert!(crisis.has_keyword("crisis"));
    }

    #[test]
    fn test_parse_json_array_and_lines() {
        let array = r#"[{"id": "fin_010", "domain": "finance", "reliability_score": 0.8, "content": "x"}]"#;
        let records = parse_records(array).unwrap().records;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reliability, Some(0.8));
        assert_eq!(records[0].source_type, SourceType::Other);

        let lines = "{\"id\": \"a\", \"source_type\": \"academic_research\"}\n\n{\"id\": \"b\"}\n";
        let parsed = parse_records(lines).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.records[0].source_type, SourceType::ResearchPaper);
    }

    #[test]
    fn test_bad_line_is_skipped_not_fatal() {
        let lines = r#"{"id": "fin_010", "domain": "finance", "reliability": 0.8, "content": "x"}
{"id": "fin_011", "domain": "finance", "reliability": "high", "content": "y"}
{not json
{"id": "fin_012", "domain": "finance", "reliability": 0.7, "content": "z"}"#;
        let parsed = parse_records(lines).unwrap();

        let ids: Vec<&str> = parsed.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["fin_010", "fin_012"]);
        assert_eq!(parsed.skipped.len(), 2);
        assert_eq!(parsed.skipped[0].id, "fin_011");
        assert!(parsed.skipped[0].reason.starts_with("invalid JSON"));
        assert_eq!(parsed.skipped[1].id, "<line 3>");
    }

    #[test]
    fn test_bad_array_entry_is_skipped() {
        let array = r#"[{"id": "fin_010", "content": "x"}, {"id": "fin_011", "keywords": "bond"}, 7]"#;
        let parsed = parse_records(array).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.skipped[0].id, "fin_011");
        assert_eq!(parsed.skipped[1].id, "<entry 3>");
    }

    #[test]
    fn test_broken_array_document_fails() {
        assert!(matches!(parse_records("[{not json"), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_dataset_record_shape() {
        let question = "What is the difference between a Roth IRA and a traditional IRA for someone early in their career?";
        let record = dataset_record(Domain::Finance, 7, question, "Roth contributions are taxed now.");

        assert_eq!(record.id, "dataset_fin_0007");
        assert!(record.title.starts_with("Finance Q&A: What is the difference"));
        assert!(record.title.ends_with("..."));
        assert!(record.content.starts_with("Q: What is the difference"));
        assert!(record.content.contains("\n\nA: Roth contributions"));
        assert_eq!(record.reliability, Some(DATASET_RELIABILITY));
        assert_eq!(record.origin, SourceOrigin::Dataset);
        assert_eq!(record.source_type, SourceType::QaDataset);
    }

    #[test]
    fn test_qa_dataset_drops_empty_pairs() {
        let input = r#"{"question": "Is metformin safe?", "answer": "Generally, yes."}
{"question": "", "answer": "orphan"}
{"question": "What lowers HbA1c?", "answer": "Diet and exercise."}"#;
        let records = parse_qa_dataset(input, Domain::Medical).unwrap().records;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, "dataset_med_0001");
        assert_eq!(records[0].title, "Medical Q&A: Is metformin safe?");
    }

    #[test]
    fn test_extract_keywords_ranks_title_terms() {
        let keywords = extract_keywords(
            "Hypertension Management",
            "Lifestyle changes lower blood pressure. Blood pressure targets vary.",
            3,
        );
        assert_eq!(keywords.len(), 3);
        assert!(keywords.contains("hypertension"));
        assert!(keywords.contains("management"));
        assert!(keywords.contains("blood"));
    }

    #[test]
    fn test_importer_keeps_existing_embeddings() {
        let model = HashingEmbeddingModel::new(8);
        let mut records = vec![dataset_record(Domain::Finance, 0, "q one", "a one")];
        records[0].embedding = Some(vec![1.0; 8]);
        records.push(dataset_record(Domain::Finance, 1, "bond duration", "longer is riskier"));

        let embedded = CorpusImporter::new(&model).embed_missing(&mut records).unwrap();
        assert_eq!(embedded, 1);
        assert_eq!(records[0].embedding, Some(vec![1.0; 8]));
        assert_eq!(records[1].embedding.as_ref().map(Vec::len), Some(8));
    }
}
