//! Feature collection classification.
//!
//! Every loaded collection is assigned to exactly one of four categories, or
//! discarded. Classification is a pure function of the collection and its
//! source path hint: same input, same answer, no side effects.

use serde::{Deserialize, Serialize};

use crate::geodata::FeatureCollection;

/// The closed set of layer categories.
///
/// The declaration order is also the wire order of category blocks in the
/// compact token, and the single-digit codes are stable forever: renumbering
/// them would break previously shared URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sectors,
    Stars,
    Sids,
    Videomap,
}

/// All categories, in wire order.
pub const ALL_CATEGORIES: [Category; 4] = [
    Category::Sectors,
    Category::Stars,
    Category::Sids,
    Category::Videomap,
];

impl Category {
    /// Lowercase name, as used in file paths and the file index.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sectors => "sectors",
            Category::Stars => "stars",
            Category::Sids => "sids",
            Category::Videomap => "videomap",
        }
    }

    /// Single-digit abbreviation used by the compact token.
    pub fn abbrev(&self) -> char {
        match self {
            Category::Sectors => '1',
            Category::Stars => '2',
            Category::Sids => '3',
            Category::Videomap => '4',
        }
    }

    /// Resolve a token abbreviation back to a category.
    pub fn from_abbrev(abbrev: &str) -> Option<Self> {
        match abbrev {
            "1" => Some(Category::Sectors),
            "2" => Some(Category::Stars),
            "3" => Some(Category::Sids),
            "4" => Some(Category::Videomap),
            _ => None,
        }
    }

    /// Parse a literal category name (a path segment, case-insensitive).
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment.to_ascii_lowercase().as_str() {
            "sectors" => Some(Category::Sectors),
            "stars" => Some(Category::Stars),
            "sids" => Some(Category::Sids),
            "videomap" => Some(Category::Videomap),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a collection, first match wins:
///
/// 1. the path hint's leading segment names a category literally;
/// 2. the first feature carries a `Position` property → sectors;
/// 3. the first feature's `type` is `STAR` or `SID` (case-insensitive);
/// 4. the collection name contains `video` (case-insensitive) → videomap.
///
/// Returns `None` for an unclassifiable collection; the caller discards the
/// file with a diagnostic.
pub fn classify(collection: &FeatureCollection, path_hint: &str) -> Option<Category> {
    let leading = path_hint.split('/').next().unwrap_or(path_hint);
    if let Some(category) = Category::from_segment(leading) {
        return Some(category);
    }

    if let Some(first) = collection.features.first() {
        if first.properties.get("Position").is_some() {
            return Some(Category::Sectors);
        }
        if let Some(kind) = first.properties.get("type").and_then(|v| v.as_str()) {
            match kind.to_ascii_uppercase().as_str() {
                "STAR" => return Some(Category::Stars),
                "SID" => return Some(Category::Sids),
                _ => {}
            }
        }
    }

    if let Some(name) = collection.name.as_deref() {
        if name.to_ascii_lowercase().contains("video") {
            return Some(Category::Videomap);
        }
    }

    None
}
