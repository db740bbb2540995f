//! Citations from an external search capability

use crate::config::EnhancerConfig;
use crate::evidence::reliability_boost;
use fair_domain::traits::ExternalSearch;
use fair_domain::{Domain, EnhancementKind, EnhancementOutcome};
use tracing::{debug, warn};

/// Search externally and append an "Additional sources" section
///
/// A failing search is logged and yields a not-applied outcome.
pub fn enhance(
    search: &dyn ExternalSearch,
    query: &str,
    domain: Domain,
    config: &EnhancerConfig,
) -> EnhancementOutcome {
    let items = match search.search(query, domain, config.external_limit) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, domain = %domain, "External search failed");
            return EnhancementOutcome::not_applied(EnhancementKind::External);
        }
    };

    let items: Vec<_> = items
        .into_iter()
        .filter(|item| !item.title.trim().is_empty())
        .take(config.external_limit)
        .collect();
    if items.is_empty() {
        debug!(domain = %domain, "External search returned nothing usable");
        return EnhancementOutcome::not_applied(EnhancementKind::External);
    }

    let boost = reliability_boost(
        items.iter().map(|item| item.reliability),
        config.expected_sources,
        config.boost_limits.external,
    );

    let mut fragment = String::from("**Additional sources:**\n");
    for item in &items {
        if item.url.is_empty() {
            fragment.push_str(&format!("- {}\n", item.title));
        } else {
            fragment.push_str(&format!("- {} ({})\n", item.title, item.url));
        }
    }

    EnhancementOutcome::applied(EnhancementKind::External, boost, fragment.trim_end())
}
