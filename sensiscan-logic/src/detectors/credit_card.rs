use lazy_static::lazy_static;
use regex::Regex;

use super::context::{gate_admits, snippet};
use super::types::{DetectorKind, FindingRecord, ScanTarget};

const GATE_KEYWORDS: &[&str] = &[
    "card", "credit", "visa", "mastercard", "amex", "discover", "payment",
];

lazy_static! {
    // 13-19 digits, optionally grouped with single spaces or dashes between digits.
    static ref CANDIDATE_RE: Regex =
        Regex::new(r"\b\d(?:[ -]?\d){12,18}\b").unwrap();
}

fn strip_separators(matched: &str) -> String {
    matched.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Luhn checksum: every second digit from the right is doubled, digits
/// above 9 have 9 cast out, and the total digit sum must be divisible by 10.
pub fn luhn_valid(digits: &str) -> bool {
    if !(13..=19).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let mut d = (b - b'0') as u32;
            if i % 2 == 1 {
                d *= 2;
                if d > 9 {
                    d -= 9;
                }
            }
            d
        })
        .sum();

    sum % 10 == 0
}

fn mask(stripped: &str) -> String {
    let last4 = &stripped[stripped.len() - 4..];
    format!("****-****-****-{last4}")
}

pub fn scan(text: &str, target: &ScanTarget) -> Vec<FindingRecord> {
    CANDIDATE_RE
        .find_iter(text)
        .filter_map(|m| {
            let stripped = strip_separators(m.as_str());
            if !luhn_valid(&stripped) {
                return None;
            }
            if !gate_admits(text, m.start(), m.end(), GATE_KEYWORDS) {
                return None;
            }
            Some(FindingRecord {
                job_id: target.job_id,
                bucket: target.bucket.clone(),
                key: target.key.clone(),
                entity_tag: target.entity_tag.clone(),
                detector: DetectorKind::CreditCard,
                masked_match: mask(&stripped),
                context: snippet(text, m.start(), m.end()),
                byte_offset: m.start() as i64,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn target() -> ScanTarget {
        ScanTarget {
            job_id: uuid::Uuid::nil(),
            bucket: "b".into(),
            key: "k".into(),
            entity_tag: "e".into(),
        }
    }

    #[rstest]
    #[case("4532015112830366", true)]
    #[case("4532015112830367", false)]
    #[case("123456789012", false)] // too short
    fn luhn_cases(#[case] digits: &str, #[case] expected: bool) {
        assert_eq!(luhn_valid(digits), expected);
    }

    #[test]
    fn matches_valid_luhn_with_context() {
        let text = "card 4532015112830366 charged";
        let findings = scan(text, &target());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].masked_match, "****-****-****-0366");
    }

    #[test]
    fn rejects_luhn_invalid_even_with_context() {
        let text = "card 4532015112830367 charged";
        assert!(scan(text, &target()).is_empty());
    }

    #[test]
    fn rejects_luhn_valid_without_context_keyword() {
        // 4111111111111111 is a well-known Luhn-valid test number.
        let text = "number 4111111111111111 listed";
        assert!(luhn_valid("4111111111111111"));
        assert!(scan(text, &target()).is_empty());
    }
}
