//! Directive extraction from issue and pull-request descriptions.
//!
//! A directive is a fixed marker (e.g. `**Labels**:`) followed somewhere
//! later in the body by a bracketed, delimiter-separated value list. This is
//! a narrow first-match text scan, not a parser for the description format.

/// Marker for the labels directive.
pub const LABELS_MARKER: &str = "**Labels**:";

/// Marker for the projects directive.
pub const PROJECTS_MARKER: &str = "**Projects**:";

/// Delimiter used by all current directive callers.
pub const VALUE_DELIMITER: char = ',';

/// Extract directive values from `text`.
///
/// Locates the first occurrence of `marker`, then the first `[` after it and
/// the first `]` after that. The substring between the brackets is split on
/// `delimiter`, each piece trimmed, empty pieces dropped. Source order is
/// preserved and duplicates are not removed here.
///
/// A missing marker or malformed bracket pair resolves to an empty list,
/// never an error: a broken directive means "no values".
#[must_use]
pub fn extract(text: &str, marker: &str, delimiter: char) -> Vec<String> {
    let Some(marker_pos) = text.find(marker) else {
        return Vec::new();
    };

    let after_marker = &text[marker_pos + marker.len()..];
    let Some(open) = after_marker.find('[') else {
        return Vec::new();
    };
    let Some(close) = after_marker[open + 1..].find(']') else {
        return Vec::new();
    };

    after_marker[open + 1..open + 1 + close]
        .split(delimiter)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(String::from)
        .collect()
}

/// Values present in `new_body`'s directive but not in `prior_body`'s.
///
/// Used on `edited` events to narrow project placement to newly added names,
/// so that re-saving a description does not re-trigger side effects for
/// values already acted upon. Order follows `new_body`'s extraction;
/// duplicates collapse to their first occurrence.
#[must_use]
pub fn added_values(new_body: &str, prior_body: &str, marker: &str) -> Vec<String> {
    let prior = extract(prior_body, marker, VALUE_DELIMITER);
    let mut added = Vec::new();

    for value in extract(new_body, marker, VALUE_DELIMITER) {
        if !prior.contains(&value) && !added.contains(&value) {
            added.push(value);
        }
    }

    added
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_basic() {
        let body = "Some intro\n**Labels**: [bug, ui]\nmore text";
        assert_eq!(extract(body, LABELS_MARKER, ','), vec!["bug", "ui"]);
    }

    #[test]
    fn test_extract_missing_marker() {
        assert_eq!(
            extract("no directives here", LABELS_MARKER, ','),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_extract_trims_whitespace() {
        let body = "**Labels**: [ bug ,  ui ]";
        assert_eq!(extract(body, LABELS_MARKER, ','), vec!["bug", "ui"]);
    }

    #[test]
    fn test_extract_drops_empty_pieces() {
        let body = "**Labels**: [bug,, ,ui]";
        assert_eq!(extract(body, LABELS_MARKER, ','), vec!["bug", "ui"]);
    }

    #[test]
    fn test_extract_malformed_bracket_order() {
        assert_eq!(
            extract("**Labels**: ] bug [", LABELS_MARKER, ','),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_extract_no_closing_bracket() {
        assert_eq!(
            extract("**Labels**: [bug, ui", LABELS_MARKER, ','),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_extract_empty_brackets() {
        assert_eq!(
            extract("**Labels**: []", LABELS_MARKER, ','),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_extract_first_marker_governs() {
        let body = "**Labels**: [bug]\n**Labels**: [ui]";
        assert_eq!(extract(body, LABELS_MARKER, ','), vec!["bug"]);
    }

    #[test]
    fn test_extract_preserves_order_and_duplicates() {
        let body = "**Projects**: [Roadmap, Triage, Roadmap]";
        assert_eq!(
            extract(body, PROJECTS_MARKER, ','),
            vec!["Roadmap", "Triage", "Roadmap"]
        );
    }

    #[test]
    fn test_extract_markers_are_independent() {
        let body = "**Labels**: [bug, p1]\n**Projects**: [Roadmap]";
        assert_eq!(extract(body, LABELS_MARKER, ','), vec!["bug", "p1"]);
        assert_eq!(extract(body, PROJECTS_MARKER, ','), vec!["Roadmap"]);
    }

    #[test]
    fn test_added_values_returns_only_additions() {
        let prior = "**Projects**: [Roadmap]";
        let new = "**Projects**: [Roadmap, Triage]";
        assert_eq!(added_values(new, prior, PROJECTS_MARKER), vec!["Triage"]);
    }

    #[test]
    fn test_added_values_empty_when_unchanged() {
        let body = "**Projects**: [Roadmap]";
        assert_eq!(
            added_values(body, body, PROJECTS_MARKER),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_added_values_empty_prior_body() {
        let new = "**Projects**: [Roadmap, Triage]";
        assert_eq!(
            added_values(new, "", PROJECTS_MARKER),
            vec!["Roadmap", "Triage"]
        );
    }

    #[test]
    fn test_added_values_collapses_duplicates() {
        let new = "**Projects**: [Triage, Triage]";
        let prior = "**Projects**: [Roadmap]";
        assert_eq!(added_values(new, prior, PROJECTS_MARKER), vec!["Triage"]);
    }

    #[test]
    fn test_added_values_ignores_removals() {
        let prior = "**Projects**: [Roadmap, Triage]";
        let new = "**Projects**: [Triage]";
        assert_eq!(
            added_values(new, prior, PROJECTS_MARKER),
            Vec::<String>::new()
        );
    }
}
