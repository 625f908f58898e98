//! Altitude and speed constraint parsing for procedure points.
//!
//! Procedure point features carry constraint strings in a prefixed form:
//! `@080` (cross at), `+080` (at or above), `-120` (at or below). A legacy
//! whitespace-separated form (`"abv 130"`, `"below 120"`) is still accepted.
//!
//! Parsed constraints are ordered so that every "below" bound sorts ahead of
//! the others while preserving relative order otherwise, which is how the
//! labels stack visually. At most two constraints of each kind are retained
//! per point.

/// Maximum number of constraints of one kind kept per point.
pub const MAX_PER_KIND: usize = 2;

/// The bound expressed by a constraint prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    /// Cross exactly at the value (`@`).
    At,
    /// Cross at or above the value (`+`).
    Above,
    /// Cross at or below the value (`-`).
    Below,
}

impl Bound {
    /// Canonical lowercase name, also used as a style class by renderers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Bound::At => "at",
            Bound::Above => "above",
            Bound::Below => "below",
        }
    }

    /// Parse a legacy word form (`"abv"`, `"above"`, ...).
    fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "at" => Some(Bound::At),
            "abv" | "above" => Some(Bound::Above),
            "blw" | "below" => Some(Bound::Below),
            _ => None,
        }
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single parsed constraint: a bound and its value text.
///
/// The value is kept as text (`"080"`, `"250"`) — formatting for display is
/// the renderer's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub bound: Bound,
    pub value: String,
}

impl Constraint {
    pub fn new(bound: Bound, value: impl Into<String>) -> Self {
        Self {
            bound,
            value: value.into(),
        }
    }

    /// Parse one raw constraint string.
    ///
    /// Returns `None` for empty or unrecognizable input; such entries are
    /// dropped rather than rendered with a blank bound.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Some(rest) = trimmed.strip_prefix('@') {
            return Some(Self::new(Bound::At, rest.trim()));
        }
        if let Some(rest) = trimmed.strip_prefix('+') {
            return Some(Self::new(Bound::Above, rest.trim()));
        }
        if let Some(rest) = trimmed.strip_prefix('-') {
            return Some(Self::new(Bound::Below, rest.trim()));
        }

        // Legacy format: "<word> <value>"
        let mut parts = trimmed.split_whitespace();
        let word = parts.next()?;
        let bound = Bound::from_word(word)?;
        let value = parts.collect::<Vec<_>>().join(" ");
        Some(Self::new(bound, value))
    }
}

/// Parse a list of raw constraint strings into ordered, capped constraints.
///
/// Unparseable entries are dropped. The result is stably sorted so "below"
/// bounds come first, then truncated to [`MAX_PER_KIND`].
pub fn parse_constraints<S: AsRef<str>>(raw: &[S]) -> Vec<Constraint> {
    let mut parsed: Vec<Constraint> = raw
        .iter()
        .filter_map(|s| Constraint::parse(s.as_ref()))
        .collect();

    // Stable sort on a single boolean key: below-bounds first.
    parsed.sort_by_key(|c| c.bound != Bound::Below);
    parsed.truncate(MAX_PER_KIND);
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_prefixed_forms() {
        assert_eq!(
            Constraint::parse("@080"),
            Some(Constraint::new(Bound::At, "080"))
        );
        assert_eq!(
            Constraint::parse("+050"),
            Some(Constraint::new(Bound::Above, "050"))
        );
        assert_eq!(
            Constraint::parse("-120"),
            Some(Constraint::new(Bound::Below, "120"))
        );
    }

    #[test]
    fn test_parse_legacy_form() {
        assert_eq!(
            Constraint::parse("abv 130"),
            Some(Constraint::new(Bound::Above, "130"))
        );
        assert_eq!(
            Constraint::parse("below 120"),
            Some(Constraint::new(Bound::Below, "120"))
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(Constraint::parse(""), None);
        assert_eq!(Constraint::parse("   "), None);
        assert_eq!(Constraint::parse("around 100"), None);
    }

    #[test]
    fn test_below_sorts_first() {
        let parsed = parse_constraints(&strs(&["+080", "-120"]));
        assert_eq!(
            parsed,
            vec![
                Constraint::new(Bound::Below, "120"),
                Constraint::new(Bound::Above, "080"),
            ]
        );
    }

    #[test]
    fn test_sort_is_stable() {
        let parsed = parse_constraints(&strs(&["-100", "-090"]));
        assert_eq!(parsed[0].value, "100");
        assert_eq!(parsed[1].value, "090");
    }

    #[test]
    fn test_extras_ignored() {
        let parsed = parse_constraints(&strs(&["@080", "+090", "-120"]));
        assert_eq!(parsed.len(), MAX_PER_KIND);
        // The below entry survives the cap because it sorts first.
        assert_eq!(parsed[0].bound, Bound::Below);
    }

    #[test]
    fn test_unparseable_entries_dropped() {
        let parsed = parse_constraints(&strs(&["junk", "@100"]));
        assert_eq!(parsed, vec![Constraint::new(Bound::At, "100")]);
    }
}
