//! Bulk import of VPS servers from a CSV export.
//!
//! Every data row is upserted by `code` in its own transaction. A row that
//! fails validation or hits a database error is recorded in the report and
//! the import carries on with the next row; rows already committed stay
//! committed.

use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, warn};

use crate::db::services::vps_server_service::{upsert_by_code, UpsertAction};

pub mod record;

pub use record::{extract_code, parse_is_active, RawRow, VpsCsvRecord, CODE_HEADERS};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// A row that could not be imported.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RowFailure {
    /// Line number in the uploaded file, the header being line 1.
    pub line: u64,
    pub code: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ImportReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: Vec<RowFailure>,
    /// Set once per import when at least one row had no usable code.
    pub missing_code_warning: Option<String>,
    /// The upload contained bytes that were not valid UTF-8.
    pub lossy_decoding: bool,
}

impl ImportReport {
    pub fn total_rows(&self) -> usize {
        self.created + self.updated + self.skipped + self.failed.len()
    }
}

/// Decoded and parsed CSV content.
#[derive(Debug, Clone, Default)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<(u64, RawRow)>,
    pub lossy: bool,
}

/// Decodes `bytes` as UTF-8, replacing invalid sequences, and splits it into
/// header-keyed rows. Short rows are padded with empty values; extra cells are ignored.
pub fn parse_csv(bytes: &[u8]) -> Result<ParsedCsv, ImportError> {
    let (text, had_errors) = encoding_rs::UTF_8.decode_without_bom_handling(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 2);
        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push((line, row));
    }

    Ok(ParsedCsv {
        headers,
        rows,
        lossy: had_errors,
    })
}

/// Imports a CSV upload, upserting one VPS server per row keyed by `code`.
pub async fn import_vps_csv(
    db: &DatabaseConnection,
    bytes: &[u8],
) -> Result<ImportReport, ImportError> {
    let parsed = parse_csv(bytes)?;
    let mut report = ImportReport {
        lossy_decoding: parsed.lossy,
        ..Default::default()
    };

    if parsed.lossy {
        warn!("CSV upload was not valid UTF-8; invalid bytes were replaced.");
    }

    for (line, row) in &parsed.rows {
        let record = match VpsCsvRecord::from_row(row) {
            Ok(Some(record)) => record,
            Ok(None) => {
                report.skipped += 1;
                continue;
            }
            Err(e) => {
                warn!(line, error = %e, "Rejected CSV row.");
                report.failed.push(RowFailure {
                    line: *line,
                    code: extract_code(row),
                    error: e.to_string(),
                });
                continue;
            }
        };

        // Rows created through the import are inactive unless the file says otherwise.
        match upsert_by_code(db, &record.code, record.changes, false).await {
            Ok(UpsertAction::Created) => report.created += 1,
            Ok(UpsertAction::Updated) => report.updated += 1,
            Err(e) => {
                warn!(line, code = %record.code, error = %e, "Failed to upsert CSV row.");
                report.failed.push(RowFailure {
                    line: *line,
                    code: Some(record.code),
                    error: e.to_string(),
                });
            }
        }
    }

    if report.skipped > 0 {
        report.missing_code_warning = Some(missing_code_warning(&parsed.headers));
    }

    info!(
        created = report.created,
        updated = report.updated,
        skipped = report.skipped,
        failed = report.failed.len(),
        "CSV import finished."
    );
    Ok(report)
}

fn missing_code_warning(headers: &[String]) -> String {
    let seen: Vec<String> = headers.iter().map(|h| format!("{h:?}")).collect();
    format!(
        "Some rows were skipped because no 'code' value was found. Headers seen: [{}]",
        seen.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_with_bom_still_yields_code() {
        let parsed = parse_csv("\u{feff}Code,friendly_name\nABC,Main\n".as_bytes()).unwrap();
        assert!(parsed.headers[0].ends_with("Code"));
        assert_eq!(extract_code(&parsed.rows[0].1), Some("ABC".to_string()));
        assert!(!parsed.lossy);
    }

    #[test]
    fn test_parse_csv_replaces_invalid_utf8() {
        let mut bytes = b"code,notes\nA1,caf".to_vec();
        bytes.push(0xff);
        bytes.extend_from_slice(b"\n");
        let parsed = parse_csv(&bytes).unwrap();
        assert!(parsed.lossy);
        assert_eq!(parsed.rows[0].1["notes"], "caf\u{fffd}");
    }

    #[test]
    fn test_parse_csv_pads_short_rows() {
        let parsed = parse_csv(b"code,hostname,domain\nA1,host\nA2,h2,d2,extra\n").unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].1["domain"], "");
        assert_eq!(parsed.rows[1].1["domain"], "d2");
        assert_eq!(parsed.rows[1].1.len(), 3);
        assert_eq!(parsed.rows[0].0, 2);
    }

    #[test]
    fn test_missing_code_warning_lists_headers() {
        let warning = missing_code_warning(&["name".to_string(), "ip".to_string()]);
        assert!(warning.contains("\"name\""));
        assert!(warning.contains("\"ip\""));
    }
}
