use uuid::Uuid;

/// A single detector hit produced by [`crate::detectors::scan`].
///
/// Mirrors the `findings` row shape one-to-one except for `created_at`,
/// which the store adapter stamps on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindingRecord {
    pub job_id: Uuid,
    pub bucket: String,
    pub key: String,
    pub entity_tag: String,
    pub detector: DetectorKind,
    pub masked_match: String,
    pub context: String,
    pub byte_offset: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorKind {
    Ssn,
    CreditCard,
    AwsAccessKey,
    AwsSecretKey,
    Email,
    UsPhone,
}

impl DetectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::Ssn => "SSN",
            DetectorKind::CreditCard => "CREDIT_CARD",
            DetectorKind::AwsAccessKey => "AWS_ACCESS_KEY",
            DetectorKind::AwsSecretKey => "AWS_SECRET_KEY",
            DetectorKind::Email => "EMAIL",
            DetectorKind::UsPhone => "US_PHONE",
        }
    }
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifying metadata carried alongside the scanned text, used to stamp
/// every finding produced from that buffer.
#[derive(Debug, Clone)]
pub struct ScanTarget {
    pub job_id: Uuid,
    pub bucket: String,
    pub key: String,
    pub entity_tag: String,
}
