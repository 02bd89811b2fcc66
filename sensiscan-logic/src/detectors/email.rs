use lazy_static::lazy_static;
use regex::Regex;

use super::context::snippet;
use super::types::{DetectorKind, FindingRecord, ScanTarget};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
}

fn mask(matched: &str) -> String {
    match matched.split_once('@') {
        Some((local, domain)) => {
            let prefix: String = local.chars().take(2).collect();
            format!("{prefix}***@{domain}")
        }
        None => "***".to_string(),
    }
}

/// EMAIL: no context gate.
pub fn scan(text: &str, target: &ScanTarget) -> Vec<FindingRecord> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| FindingRecord {
            job_id: target.job_id,
            bucket: target.bucket.clone(),
            key: target.key.clone(),
            entity_tag: target.entity_tag.clone(),
            detector: DetectorKind::Email,
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
    fn masks_local_part_keeping_domain() {
        let findings = scan("contact jsmith@example.com for details", &target());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].masked_match, "js***@example.com");
    }

    #[test]
    fn empty_buffer_yields_no_findings() {
        assert!(scan("", &target()).is_empty());
    }
}
