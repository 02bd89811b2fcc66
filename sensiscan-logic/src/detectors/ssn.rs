use lazy_static::lazy_static;
use regex::Regex;

use super::context::{gate_admits, snippet};
use super::types::{DetectorKind, FindingRecord, ScanTarget};

const GATE_KEYWORDS: &[&str] = &["ssn", "social security", "social-security", "ss#", "ss #"];

lazy_static! {
    static ref SSN_RE: Regex = Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap();
}

fn mask(matched: &str) -> String {
    let last4 = &matched[matched.len() - 4..];
    format!("***-**-{last4}")
}

pub fn scan(text: &str, target: &ScanTarget) -> Vec<FindingRecord> {
    SSN_RE
        .find_iter(text)
        .filter(|m| gate_admits(text, m.start(), m.end(), GATE_KEYWORDS))
        .map(|m| FindingRecord {
            job_id: target.job_id,
            bucket: target.bucket.clone(),
            key: target.key.clone(),
            entity_tag: target.entity_tag.clone(),
            detector: DetectorKind::Ssn,
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
    fn matches_gated_ssn() {
        let text = "Employee SSN: 123-45-6789 in record";
        let findings = scan(text, &target());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].masked_match, "***-**-6789");
        assert_eq!(findings[0].byte_offset, 14);
    }

    #[test]
    fn rejects_without_keyword() {
        let text = "reference number 123-45-6789 appears here";
        let findings = scan(text, &target());
        assert!(findings.is_empty());
    }

    #[test]
    fn deterministic_across_runs() {
        let text = "ssn 111-22-3333 and ssn 444-55-6666";
        let a = scan(text, &target());
        let b = scan(text, &target());
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }
}
