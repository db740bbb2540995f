//! Report identifiers

use serde::{Serialize, Serializer};
use std::fmt;

/// Time-ordered identifier of one trust report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReportId(u128);

impl ReportId {
    /// Generate a new UUIDv7-based id
    ///
    /// # Examples
    ///
    /// ```
    /// use fair_domain::ReportId;
    ///
    /// let first = ReportId::new();
    /// let second = ReportId::new();
    /// assert_ne!(first, second);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Parse from the hyphenated UUID form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid report id: {}", e))
    }

    /// Raw value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl Serialize for ReportId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
