//! Rejection reason categories.

use serde::{Deserialize, Serialize};
use std::fmt;

const DIMENSIONAL_KEYWORDS: &[&str] = &[
    "dimension",
    "size",
    "measurement",
    "weight",
    "position",
    "height",
    "width",
    "length",
    "tolerance",
    "maximum",
];

const TAG_TRACKING_KEYWORDS: &[&str] = &[
    "tag",
    "label",
    "lpn",
    "barcode",
    "duplicate",
    "unit data not found",
    "tracking",
    "expected",
    "exist",
    "system",
    "error",
    "timeout",
    "failed",
    "check error",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Dimensional,
    TagTrackingSystem,
    Uncategorized,
}

impl Category {
    /// Report order.
    pub const ALL: [Category; 3] = [
        Category::Dimensional,
        Category::TagTrackingSystem,
        Category::Uncategorized,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Dimensional => "Dimensional",
            Category::TagTrackingSystem => "Tag/Tracking/System",
            Category::Uncategorized => "Uncategorized",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a free-text reject reason by case-insensitive keyword
/// containment. Dimensional keywords are tested first.
pub fn categorize(reason: Option<&str>) -> Category {
    let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) else {
        return Category::Uncategorized;
    };
    let lower = reason.to_lowercase();
    if DIMENSIONAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Category::Dimensional
    } else if TAG_TRACKING_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Category::TagTrackingSystem
    } else {
        Category::Uncategorized
    }
}

/// Emit the reasons that matched no keyword so an operator can extend the
/// keyword lists.
pub fn log_uncategorized(reasons: &[(String, usize)]) {
    if reasons.is_empty() {
        return;
    }
    log::info!("Uncategorized rejection reasons that need categorization:");
    for (reason, count) in reasons {
        log::info!("  - '{}': {} occurrences", reason, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_examples() {
        assert_eq!(
            categorize(Some("Duplicated LPN detected")),
            Category::TagTrackingSystem
        );
        assert_eq!(
            categorize(Some("Height out of tolerance")),
            Category::Dimensional
        );
    }

    #[test]
    fn dimensional_is_checked_first() {
        // Contains both "weight" and "error".
        assert_eq!(categorize(Some("WEIGHT CHECK ERROR")), Category::Dimensional);
    }

    #[test]
    fn unmatched_and_empty_are_uncategorized() {
        assert_eq!(categorize(Some("Operator removed")), Category::Uncategorized);
        assert_eq!(categorize(Some("   ")), Category::Uncategorized);
        assert_eq!(categorize(None), Category::Uncategorized);
        assert_eq!(categorize(Some("Unknown")), Category::Uncategorized);
    }

    #[test]
    fn labels() {
        assert_eq!(Category::TagTrackingSystem.to_string(), "Tag/Tracking/System");
        assert_eq!(Category::ALL.len(), 3);
    }
}
