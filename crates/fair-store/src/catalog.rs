//! In-memory evidence catalog

use crate::corpus::{extract_keywords, CorpusRecord, KEYWORD_LIMIT};
use crate::StoreError;
use fair_domain::text::fold_plural;
use fair_domain::traits::EvidenceStore;
use fair_domain::{Domain, EvidenceItem, SourceId};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{info, warn};

/// An item rejected while building a catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    /// Source id, or `<missing>`
    pub id: String,
    /// Why the item was rejected
    pub reason: String,
}

impl From<SkippedItem> for StoreError {
    fn from(skip: SkippedItem) -> Self {
        StoreError::MalformedItem {
            id: skip.id,
            reason: skip.reason,
        }
    }
}

/// Result of building a catalog
#[derive(Debug)]
pub struct CatalogBuild {
    /// The catalog of valid items
    pub catalog: EvidenceCatalog,
    /// Items that were skipped as malformed
    pub skipped: Vec<SkippedItem>,
}

impl CatalogBuild {
    /// The catalog, or the first skipped item as an error
    pub fn into_strict(self) -> Result<EvidenceCatalog, StoreError> {
        match self.skipped.into_iter().next() {
            Some(skip) => Err(skip.into()),
            None => Ok(self.catalog),
        }
    }
}

/// Immutable, domain-indexed collection of evidence items
#[derive(Debug, Clone)]
pub struct EvidenceCatalog {
    dimension: usize,
    items: Vec<Arc<EvidenceItem>>,
    by_id: HashMap<SourceId, usize>,
    by_domain: HashMap<Domain, Vec<usize>>,
}

impl EvidenceCatalog {
    /// A catalog with no items
    pub fn empty(dimension: usize) -> Self {
        Self {
            dimension,
            items: Vec::new(),
            by_id: HashMap::new(),
            by_domain: HashMap::new(),
        }
    }

    /// Build a catalog from corpus records
    ///
    /// Every record must carry an embedding of `dimension` values and a
    /// finance or medical domain tag. Records that do not, and duplicates of
    /// an id already accepted, are skipped and logged.
    pub fn build(dimension: usize, records: impl IntoIterator<Item = CorpusRecord>) -> CatalogBuild {
        let mut catalog = Self::empty(dimension);
        let mut skipped = Vec::new();

        for record in records {
            if let Err(skip) = catalog.admit(record) {
                warn!(source_id = %skip.id, reason = %skip.reason, "Skipping malformed corpus item");
                skipped.push(skip);
            }
        }

        info!(
            items = catalog.len(),
            finance = catalog.domain_len(Domain::Finance),
            medical = catalog.domain_len(Domain::Medical),
            skipped = skipped.len(),
            "Built evidence catalog"
        );

        CatalogBuild { catalog, skipped }
    }

    fn admit(&mut self, record: CorpusRecord) -> Result<(), SkippedItem> {
        let item = validate(record, self.dimension)?;
        if self.by_id.contains_key(&item.id) {
            return Err(malformed(item.id.as_str(), "duplicate source id"));
        }

        let index = self.items.len();
        self.by_id.insert(item.id.clone(), index);
        self.by_domain.entry(item.domain).or_default().push(index);
        self.items.push(Arc::new(item));
        Ok(())
    }

    /// Embedding dimension every item shares
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// All items in insertion order
    pub fn items(&self) -> &[Arc<EvidenceItem>] {
        &self.items
    }

    /// Number of items tagged with `domain`
    pub fn domain_len(&self, domain: Domain) -> usize {
        self.by_domain.get(&domain).map_or(0, Vec::len)
    }
}

impl EvidenceStore for EvidenceCatalog {
    fn candidates(&self, domain: Domain) -> Vec<Arc<EvidenceItem>> {
        if !domain.is_classified() {
            return self.items.clone();
        }
        self.by_domain
            .get(&domain)
            .map(|indices| indices.iter().map(|&i| Arc::clone(&self.items[i])).collect())
            .unwrap_or_default()
    }

    fn get(&self, id: &SourceId) -> Option<Arc<EvidenceItem>> {
        self.by_id.get(id).map(|&i| Arc::clone(&self.items[i]))
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// Check a record and turn it into an evidence item
fn validate(record: CorpusRecord, dimension: usize) -> Result<EvidenceItem, SkippedItem> {
    let id = record.id.trim().to_string();
    if id.is_empty() {
        return Err(malformed("<missing>", "missing source id"));
    }

    let domain = match record.domain.as_deref().map(str::parse::<Domain>) {
        None => return Err(malformed(&id, "missing domain tag")),
        Some(Err(e)) => return Err(malformed(&id, &e)),
        Some(Ok(Domain::General)) => return Err(malformed(&id, "unclassified domain tag")),
        Some(Ok(domain)) => domain,
    };

    let embedding = match record.embedding {
        None => return Err(malformed(&id, "missing embedding")),
        Some(e) if e.is_empty() => return Err(malformed(&id, "empty embedding")),
        Some(e) if e.len() != dimension => {
            return Err(malformed(
                &id,
                &format!("embedding dimension {} (expected {})", e.len(), dimension),
            ))
        }
        Some(e) if e.iter().any(|v| !v.is_finite()) => {
            return Err(malformed(&id, "non-finite embedding value"))
        }
        Some(e) => e,
    };

    let reliability = match record.reliability {
        None => return Err(malformed(&id, "missing reliability score")),
        Some(r) if !(0.0..=1.0).contains(&r) => {
            return Err(malformed(&id, &format!("reliability {r} outside [0, 1]")))
        }
        Some(r) => r,
    };

    if record.content.trim().is_empty() {
        return Err(malformed(&id, "empty content"));
    }

    let keywords: BTreeSet<String> = if record.keywords.is_empty() {
        extract_keywords(&record.title, &record.content, KEYWORD_LIMIT)
    } else {
        record
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .map(|k| fold_plural(&k))
            .collect()
    };

    Ok(EvidenceItem {
        id: SourceId::new(id),
        title: record.title,
        content: record.content,
        domain,
        reliability,
        publication_date: record.publication_date,
        source_type: record.source_type,
        origin: record.origin,
        url: record.url,
        keywords,
        embedding,
    })
}

fn malformed(id: &str, reason: &str) -> SkippedItem {
    SkippedItem {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}
