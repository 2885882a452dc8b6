use crate::record::SubmissionRecord;

pub fn normalize_term(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// True when `term` (already normalized) occurs in mobile, bank, amount or
/// pin. Only the bank comparison ignores case.
pub fn matches_term(record: &SubmissionRecord, term: &str) -> bool {
    record.mobile.contains(term)
        || record.bank.to_lowercase().contains(term)
        || record.amount.contains(term)
        || record.pin.contains(term)
}

/// The subsequence of `records` matching `term`, in input order. An empty
/// term keeps every record.
pub fn filter_records(term: &str, records: &[SubmissionRecord]) -> Vec<SubmissionRecord> {
    if term.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| matches_term(r, term))
        .cloned()
        .collect()
}
