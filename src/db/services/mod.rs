//! The `services` module wraps every query and mutation the web layer needs,
//! so handlers work with entity models and never build SQL themselves.

use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, DbBackend, DbErr, SqlErr};

pub mod csv_import;
pub mod pod_service;
pub mod vps_server_service;

pub use csv_import::{import_vps_csv, ImportReport, RowFailure};
pub use pod_service::*;
pub use vps_server_service::*;

/// Whether `q` searches can be pushed down as `LOWER(col) LIKE`.
///
/// SQLite's `LOWER()` only folds ASCII, so on SQLite rows are matched in Rust
/// with [`contains_ignore_case`] after the remaining filters ran in SQL.
pub(crate) fn search_in_sql(backend: DbBackend) -> bool {
    !matches!(backend, DbBackend::Sqlite)
}

/// Escapes `\`, `%` and `_` so `needle` only matches literally inside `LIKE`.
pub(crate) fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Case-insensitive literal substring match, `LOWER(col) LIKE '%needle%' ESCAPE '\'`.
pub(crate) fn icontains<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
    Expr::expr(Func::lower(Expr::col((column.entity_name(), column))))
        .like(LikeExpr::new(pattern).escape('\\'))
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
