use std::collections::HashMap;

use crate::db::services::vps_server_service::{
    VpsChanges, VpsError, parse_main_ip, parse_provider, ssh_user_or_default,
};
use crate::db::slug::slug_or_derive;

/// Header spellings accepted for the `code` column, tried in order.
pub const CODE_HEADERS: [&str; 6] = [
    "code",
    "Code",
    "CODE",
    "\u{feff}code",
    "\u{feff}Code",
    "\u{feff}CODE",
];

/// One CSV data row keyed by header name.
pub type RawRow = HashMap<String, String>;

/// A validated CSV row ready to be upserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpsCsvRecord {
    pub code: String,
    pub changes: VpsChanges,
}

/// Returns the first non-blank value among the accepted `code` headers.
pub fn extract_code(row: &RawRow) -> Option<String> {
    CODE_HEADERS
        .iter()
        .filter_map(|header| row.get(*header))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// CSV truthiness: `1`, `true`, `yes` and `y` in any case.
pub fn parse_is_active(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}

fn text(row: &RawRow, column: &str) -> Option<String> {
    row.get(column).map(|value| value.trim().to_string())
}

impl VpsCsvRecord {
    /// Maps a raw row into field changes.
    ///
    /// `Ok(None)` means the row has no usable code and must be skipped.
    /// A column missing from the header yields `None` for that field, so an
    /// update leaves the stored value alone; a present but empty column resets
    /// the field to its default.
    pub fn from_row(row: &RawRow) -> Result<Option<Self>, VpsError> {
        let Some(code) = extract_code(row) else {
            return Ok(None);
        };

        let changes = VpsChanges {
            slug: row
                .get("slug")
                .map(|provided| slug_or_derive(Some(provided), &code)),
            friendly_name: text(row, "friendly_name"),
            provider: row.get("provider").map(|v| parse_provider(v)).transpose()?,
            package: text(row, "package"),
            main_ip: row.get("main_ip").map(|v| parse_main_ip(v)).transpose()?,
            hostname: text(row, "hostname"),
            domain: text(row, "domain"),
            webmail_url: text(row, "webmail_url"),
            panel_url: text(row, "panel_url"),
            panel_username: text(row, "panel_username"),
            panel_password: text(row, "panel_password"),
            ssh_host: text(row, "ssh_host"),
            ssh_user: row.get("ssh_user").map(|v| ssh_user_or_default(v)),
            ssh_notes: text(row, "ssh_notes"),
            is_active: row.get("is_active").map(|v| parse_is_active(v)),
            notes: text(row, "notes"),
            pod: text(row, "pod").map(|v| if v.is_empty() { None } else { Some(v) }),
        };

        Ok(Some(VpsCsvRecord { code, changes }))
    }
}
