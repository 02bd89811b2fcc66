use lazy_static::lazy_static;
use regex::Regex;

use super::context::{gate_admits, snippet};
use super::types::{DetectorKind, FindingRecord, ScanTarget};

const GATE_KEYWORDS: &[&str] = &["phone", "tel", "telephone", "mobile", "cell"];

// Declared in detector-table order; findings are emitted in that order,
// sub-pattern by sub-pattern, and overlap between patterns is
// permitted (dedup happens downstream on (detector, byte_offset)).
lazy_static! {
    static ref PATTERNS: Vec<Regex> = vec![
        Regex::new(r"\b\d{3}-\d{3}-\d{4}\b").unwrap(),
        Regex::new(r"\(\d{3}\)\s?\d{3}-\d{4}").unwrap(),
        Regex::new(r"\b\d{3}\.\d{3}\.\d{4}\b").unwrap(),
        Regex::new(r"\b\d{10}\b").unwrap(),
        Regex::new(r"\b1-\d{3}-\d{3}-\d{4}\b").unwrap(),
    ];
}

fn last4_digits(matched: &str) -> String {
    let digits: String = matched.chars().filter(|c| c.is_ascii_digit()).collect();
    digits[digits.len() - 4..].to_string()
}

fn mask(matched: &str) -> String {
    format!("***-***-{}", last4_digits(matched))
}

pub fn scan(text: &str, target: &ScanTarget) -> Vec<FindingRecord> {
    PATTERNS
        .iter()
        .flat_map(|re| re.find_iter(text))
        .filter(|m| gate_admits(text, m.start(), m.end(), GATE_KEYWORDS))
        .map(|m| FindingRecord {
            job_id: target.job_id,
            bucket: target.bucket.clone(),
            key: target.key.clone(),
            entity_tag: target.entity_tag.clone(),
            detector: DetectorKind::UsPhone,
            masked_match: mask(m.as_str()),
            context: snippet(text, m.start(), m.end()),
            byte_offset: m.start() as i64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ScanTarget {
        ScanTarget {
            job_id: uuid::Uuid::nil(),
            bucket: "b".into(),
            key: "k".into(),
            entity_tag: "e".into(),
        }
    }

    #[test]
    fn dashed_phone_requires_context() {
        let gated = "call my mobile 555-123-4567 now";
        let findings = scan(gated, &target());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].masked_match, "***-***-4567");

        let ungated = "code 555-123-4567 appears in the log";
        assert!(scan(ungated, &target()).is_empty());
    }

    #[test]
    fn parenthesized_and_dotted_forms_match() {
        let text = "tel (555) 123-4567 or 555.123.4567";
        let findings = scan(text, &target());
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn bare_ten_digits_can_coexist_with_credit_card_detector() {
        // Documented Open Question: a bare 10-digit sequence that also
        // satisfies Luhn can fire as both US_PHONE and CREDIT_CARD; this
        // detector does not special-case that overlap.
        let text = "phone 4111111111 on file";
        let findings = scan(text, &target());
        assert_eq!(findings.len(), 1);
    }
}
