//! Position suffix compression.
//!
//! Within one sector item, position names are abbreviated to the shortest
//! suffix that identifies them uniquely among the item's registered
//! positions (`"ABE_E"` next to `"ABE_W"` becomes `"E"`). Decoding accepts
//! any suffix that resolves to exactly one registered position, so legacy
//! single-character suffixes keep working wherever they are unambiguous.

/// Shortest suffix of `position` matching exactly one entry of `known`.
///
/// Falls back to the full name when no suffix is unique — including the
/// degenerate case where another position ends with the whole name
/// (`"BE"` vs `"ABE"`); the decoder's exact-name tiebreak recovers those.
pub fn shortest_unique_suffix(position: &str, known: &[&str]) -> String {
    let chars: Vec<char> = position.chars().collect();
    for len in 1..=chars.len() {
        let suffix: String = chars[chars.len() - len..].iter().collect();
        let matches = known.iter().filter(|p| p.ends_with(&suffix)).count();
        if matches == 1 {
            return suffix;
        }
    }
    position.to_string()
}

/// Resolve a suffix back to a registered position.
///
/// Exactly one match wins; with several matches an exact name match wins;
/// otherwise the suffix is unresolvable and the caller drops it.
pub fn resolve_suffix<'a>(suffix: &str, known: &[&'a str]) -> Option<&'a str> {
    if suffix.is_empty() {
        return None;
    }
    let mut matches = known.iter().filter(|p| p.ends_with(suffix));
    let first = matches.next()?;
    if matches.next().is_none() {
        return Some(first);
    }
    known.iter().find(|p| **p == suffix).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_character_suffices() {
        let known = ["ABE_E", "ABE_W"];
        assert_eq!(shortest_unique_suffix("ABE_E", &known), "E");
        assert_eq!(shortest_unique_suffix("ABE_W", &known), "W");
    }

    #[test]
    fn test_shared_last_character_grows() {
        // "NE" and "SE" share the last character; two suffice.
        let known = ["NE", "SE"];
        assert_eq!(shortest_unique_suffix("NE", &known), "NE");
        assert_eq!(shortest_unique_suffix("SE", &known), "SE");
    }

    #[test]
    fn test_full_name_as_suffix_of_sibling() {
        // Every suffix of "BE" is also a suffix of "ABE": fall back to the
        // full name and rely on the decode tiebreak.
        let known = ["ABE", "BE"];
        assert_eq!(shortest_unique_suffix("BE", &known), "BE");
        assert_eq!(resolve_suffix("BE", &known), Some("BE"));
        assert_eq!(resolve_suffix("ABE", &known), Some("ABE"));
    }

    #[test]
    fn test_resolve_unique() {
        let known = ["ABE_E", "ABE_W"];
        assert_eq!(resolve_suffix("E", &known), Some("ABE_E"));
        assert_eq!(resolve_suffix("_W", &known), Some("ABE_W"));
    }

    #[test]
    fn test_resolve_misses() {
        let known = ["ABE_E", "ABE_W"];
        assert_eq!(resolve_suffix("X", &known), None);
        assert_eq!(resolve_suffix("", &known), None);
        // Ambiguous with no exact match: dropped.
        assert_eq!(resolve_suffix("E", &["NE", "SE"]), None);
    }

    #[test]
    fn test_stale_position_falls_back_to_full_name() {
        // Position absent from the registry still encodes (as itself).
        assert_eq!(shortest_unique_suffix("GONE", &["N", "S"]), "GONE");
    }
}
