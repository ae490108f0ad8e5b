//! Document-level metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Information about the loaded source document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Name the document was uploaded or opened under
    pub source_name: Option<String>,

    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// PDF version (e.g., "1.7")
    pub pdf_version: String,

    /// Total number of pages in the source
    pub page_count: u32,

    /// When the scene was built
    pub loaded_at: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Create new metadata with PDF version.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            pdf_version: version.into(),
            ..Default::default()
        }
    }

    /// Set the source name.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// Stamp the load time.
    pub fn stamped(mut self) -> Self {
        self.loaded_at = Some(Utc::now());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_builders() {
        let meta = Metadata::with_version("1.7").with_source_name("report.pdf").stamped();
        assert_eq!(meta.pdf_version, "1.7");
        assert_eq!(meta.source_name.as_deref(), Some("report.pdf"));
        assert!(meta.loaded_at.is_some());
        assert!(meta.title.is_none());
    }
}
