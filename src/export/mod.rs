use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use itertools::Itertools;

use crate::record::SubmissionRecord;

pub const CSV_HEADERS: [&str; 4] = ["Mobile Number", "Amount", "Bank", "UPI Pin"];

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Header row followed by one `mobile,"amount","bank",pin` row per record,
/// newline separated without a trailing newline.
pub fn encode_csv(records: &[SubmissionRecord]) -> String {
    let header = CSV_HEADERS.iter().join(",");
    let rows = records.iter().map(|r| {
        [
            r.mobile.clone(),
            quoted(&r.amount),
            quoted(&r.bank),
            r.pin.clone(),
        ]
        .iter()
        .join(",")
    });
    std::iter::once(header).chain(rows).join("\n")
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("user-submissions-{}.csv", date.format("%Y-%m-%d"))
}

/// Resolves where an export lands: an existing directory (or a path ending
/// in a separator) gets the dated file name, anything else is a file path.
pub fn resolve_export_path(dest: Option<&Path>, date: NaiveDate) -> PathBuf {
    let filename = export_filename(date);
    match dest {
        None => PathBuf::from(filename),
        Some(p) if p.as_os_str().is_empty() => PathBuf::from(filename),
        Some(p) => {
            let raw = p.to_string_lossy();
            if p.is_dir() || raw.ends_with('/') || raw.ends_with('\\') {
                p.join(filename)
            } else {
                p.to_path_buf()
            }
        }
    }
}
