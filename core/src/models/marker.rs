/// Leading character that marks a line as a header
pub const HEADER_MARKER: char = '>';

/// Leading character that marks a line as a detail (non-header) item
pub const DETAIL_MARKER: char = '-';

/// Classify raw editor text against the line's previous classification.
///
/// A leading header marker makes the line a header, a leading detail marker
/// makes it a detail; in both cases that single character is stripped.
/// Without a marker the previous classification is kept.
pub fn classify_edit(prior_is_header: bool, raw: &str) -> (String, bool) {
    if let Some(rest) = raw.strip_prefix(HEADER_MARKER) {
        (rest.to_string(), true)
    } else if let Some(rest) = raw.strip_prefix(DETAIL_MARKER) {
        (rest.to_string(), false)
    } else {
        (raw.to_string(), prior_is_header)
    }
}

/// Loose header heuristic used for text that did not come from the editor:
/// trimmed text starting with the header marker or ending with a colon.
pub fn looks_like_header(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with(HEADER_MARKER) || trimmed.ends_with(':')
}

/// Drop a leading header marker (and the whitespace before it), if any
pub fn strip_header_marker(text: &str) -> &str {
    let trimmed = text.trim_start();
    trimmed.strip_prefix(HEADER_MARKER).unwrap_or(text)
}

/// The marker character a line is displayed with
pub fn marker_for(is_header: bool) -> char {
    if is_header {
        HEADER_MARKER
    } else {
        DETAIL_MARKER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_marker_sets_and_strips() {
        assert_eq!(classify_edit(false, ">Project"), ("Project".to_string(), true));
    }

    #[test]
    fn test_detail_marker_clears_and_strips() {
        assert_eq!(classify_edit(true, "-note"), ("note".to_string(), false));
    }

    #[test]
    fn test_classification_is_sticky() {
        assert_eq!(classify_edit(true, "Project A"), ("Project A".to_string(), true));
        assert_eq!(classify_edit(false, "Project A"), ("Project A".to_string(), false));
    }

    #[test]
    fn test_only_first_marker_is_stripped() {
        assert_eq!(classify_edit(false, ">>quoted"), (">quoted".to_string(), true));
        assert_eq!(classify_edit(false, "--flag"), ("-flag".to_string(), false));
    }

    #[test]
    fn test_marker_must_be_leading() {
        assert_eq!(classify_edit(false, " >x"), (" >x".to_string(), false));
        assert_eq!(classify_edit(false, "a-b"), ("a-b".to_string(), false));
    }

    #[test]
    fn test_empty_input_keeps_classification() {
        assert_eq!(classify_edit(true, ""), (String::new(), true));
    }

    #[test]
    fn test_looks_like_header() {
        assert!(looks_like_header("Project:"));
        assert!(looks_like_header("  > Ideas  "));
        assert!(looks_like_header("shopping:  "));
        assert!(!looks_like_header("buy milk"));
        assert!(!looks_like_header("a: b"));
    }

    #[test]
    fn test_strip_header_marker() {
        assert_eq!(strip_header_marker(">Ideas"), "Ideas");
        assert_eq!(strip_header_marker("  >Ideas"), "Ideas");
        assert_eq!(strip_header_marker("plain"), "plain");
        assert_eq!(strip_header_marker("Ends:"), "Ends:");
    }
}
