/// Width of the context window on each side of a match, in bytes.
const WINDOW: usize = 100;

/// Maximum length of the stored context snippet, in characters.
const SNIPPET_MAX_LEN: usize = 500;

/// Extracts the ±100-byte window around a match, on char boundaries.
///
/// `offset` and the window bounds are byte offsets into `text`; this walks
/// outward to the nearest char boundary rather than slicing mid-codepoint.
fn window(text: &str, offset: usize, end: usize) -> &str {
    let lo = offset.saturating_sub(WINDOW);
    let hi = (end + WINDOW).min(text.len());

    let lo = floor_char_boundary(text, lo);
    let hi = ceil_char_boundary(text, hi);
    &text[lo..hi]
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// Returns true if any gate keyword (case-insensitive) appears in the
/// ±100-byte window around the match. An empty `keywords` slice always
/// admits (ungated detectors).
pub fn gate_admits(text: &str, offset: usize, end: usize, keywords: &[&str]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let lower = window(text, offset, end).to_lowercase();
    keywords.iter().any(|kw| lower.contains(kw))
}

/// Builds the stored context snippet: the ±100-byte window, newlines
/// collapsed to spaces, trimmed, truncated to 500 characters.
pub fn snippet(text: &str, offset: usize, end: usize) -> String {
    let raw = window(text, offset, end);
    let collapsed: String = raw
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let trimmed = collapsed.trim();

    if trimmed.chars().count() <= SNIPPET_MAX_LEN {
        trimmed.to_string()
    } else {
        trimmed.chars().take(SNIPPET_MAX_LEN).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ungated_detector_always_admits() {
        assert!(gate_admits("anything at all", 0, 4, &[]));
    }

    #[test]
    fn gate_admits_case_insensitive_keyword_in_window() {
        let text = "Employee SSN: 123-45-6789 in record";
        let offset = text.find("123-45-6789").unwrap();
        let end = offset + "123-45-6789".len();
        assert!(gate_admits(text, offset, end, &["ssn", "social security"]));
    }

    #[test]
    fn gate_rejects_when_no_keyword_in_window() {
        let text = "number 1234567890123456 listed";
        let offset = text.find("1234567890123456").unwrap();
        let end = offset + 16;
        assert!(!gate_admits(text, offset, end, &["card", "credit"]));
    }

    #[test]
    fn snippet_collapses_newlines_and_trims() {
        let text = "line one\nSSN: 123-45-6789\nline three";
        let offset = text.find("123-45-6789").unwrap();
        let end = offset + 11;
        let s = snippet(text, offset, end);
        assert!(!s.contains('\n'));
        assert_eq!(s, s.trim());
    }

    #[test]
    fn snippet_truncates_to_max_len() {
        let padding = "a".repeat(1000);
        let text = format!("{padding}123-45-6789{padding}");
        let offset = text.find("123-45-6789").unwrap();
        let end = offset + 11;
        let s = snippet(&text, offset, end);
        assert!(s.len() <= SNIPPET_MAX_LEN);
    }
}
