//! The fixed category catalog, tab state and the category filter

use crate::models::ScanRecord;
use serde::{Deserialize, Serialize};

/// The closed set of classification outcomes.
///
/// The classifier labels messages with the Korean display strings; the
/// catalog is defined once and is not user-extensible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Personal,
    Alert,
    Ad,
    Newsletter,
}

impl Category {
    /// Catalog in display order.
    pub const ALL: [Category; 4] = [
        Category::Personal,
        Category::Alert,
        Category::Ad,
        Category::Newsletter,
    ];

    /// Stable numeric identifier (1-based, display order).
    pub fn id(self) -> u8 {
        match self {
            Category::Personal => 1,
            Category::Alert => 2,
            Category::Ad => 3,
            Category::Newsletter => 4,
        }
    }

    /// The wire/display label produced by the classifier.
    pub fn label(self) -> &'static str {
        match self {
            Category::Personal => "개인",
            Category::Alert => "알림",
            Category::Ad => "광고",
            Category::Newsletter => "뉴스레터",
        }
    }

    /// ASCII name for logs and machine-readable output.
    pub fn name(self) -> &'static str {
        match self {
            Category::Personal => "personal",
            Category::Alert => "alert",
            Category::Ad => "ad",
            Category::Newsletter => "newsletter",
        }
    }

    /// Tab glyph for the terminal review screen.
    pub fn icon(self) -> &'static str {
        match self {
            Category::Personal => "👤",
            Category::Alert => "🔔",
            Category::Ad => "📢",
            Category::Newsletter => "📰",
        }
    }

    /// Resolve a classifier label against the catalog.
    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.label() == label)
    }
}

/// Messages whose `pred` equals `label`, original order preserved.
///
/// Plain string equality against the record's predicted label: an
/// unknown label matches nothing and yields an empty list rather than
/// an error. The input is never mutated.
pub fn filter_by_category(records: &[ScanRecord], label: &str) -> Vec<ScanRecord> {
    records
        .iter()
        .filter(|record| record.pred == label)
        .cloned()
        .collect()
}

/// Messages whose predicted label matches no catalog entry.
///
/// These would otherwise be invisible in every tab; the review screen
/// surfaces them in a catch-all bucket instead of dropping them.
pub fn unclassified(records: &[ScanRecord]) -> Vec<ScanRecord> {
    records
        .iter()
        .filter(|record| Category::from_label(&record.pred).is_none())
        .cloned()
        .collect()
}

/// Currently-selected category tab.
///
/// Starts on the personal tab and changes only on explicit selection.
/// Selection is unconditional: the caller may set a label outside the
/// catalog, in which case the filtered list is simply empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabState {
    active: String,
}

impl TabState {
    pub fn new() -> Self {
        Self {
            active: Category::Personal.label().to_string(),
        }
    }

    /// The active tab label.
    pub fn active(&self) -> &str {
        &self.active
    }

    /// Select a tab by label, unconditionally.
    pub fn select(&mut self, label: impl Into<String>) {
        self.active = label.into();
    }

    /// The catalog entry for the active tab, if it is a known label.
    pub fn category(&self) -> Option<Category> {
        Category::from_label(&self.active)
    }
}

impl Default for TabState {
    fn default() -> Self {
        Self::new()
    }
}
