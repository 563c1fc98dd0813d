//! SQLite backend for [`TaxonSource`]

use super::{Predicate, Selection, SourceRow, TaxonSource};
use crate::error::{EngineError, Result};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::path::Path;
use tracing::{debug, trace};

/// Open a reference database without write access
pub fn open_read_only(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    debug!(path = %path.display(), "Opened reference database");
    Ok(conn)
}

/// SQL function comparing text the way [`str::to_lowercase`] does
///
/// SQLite's own `lower()` only folds ASCII, so "ÄRGER" and "ärger" would not
/// match.
const FOLD_FN: &str = "taxalign_fold";

/// Register [`FOLD_FN`] on `conn`; repeated registration replaces it
pub fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        FOLD_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(cell_text(ctx.get_raw(0)).map(|text| fold(&text))),
    )?;
    Ok(())
}

fn fold(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Double-quote an identifier, escaping embedded quotes
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Render `selection` into parameterized SQL
fn render(selection: &Selection<'_>) -> (String, Vec<String>) {
    let columns = selection
        .columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!("SELECT {} FROM {}", columns, quote_ident(selection.table));
    let mut params = Vec::new();
    let mut clauses = Vec::with_capacity(selection.predicates.len());

    for predicate in selection.predicates {
        let column = quote_ident(predicate.column());
        match predicate {
            Predicate::EqualsIgnoreCase { value, .. } => {
                params.push(fold(value));
                clauses.push(format!("{}({}) = ?{}", FOLD_FN, column, params.len()));
            },
            Predicate::Equals { value, .. } => {
                params.push(value.clone());
                clauses.push(format!("{} = ?{}", column, params.len()));
            },
            Predicate::NullOrBlank { .. } => {
                clauses.push(format!("({0} IS NULL OR trim({0}) = '')", column));
            },
        }
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    match (selection.limit, selection.offset) {
        (Some(limit), 0) => sql.push_str(&format!(" LIMIT {}", limit)),
        (Some(limit), offset) => sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset)),
        (None, 0) => {},
        (None, offset) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
    }

    (sql, params)
}

fn cell_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Probing a table also registers [`FOLD_FN`], so connections opened by the
/// caller work without extra setup.
impl TaxonSource for Connection {
    fn column_names(&self, table: &str) -> Result<Vec<String>> {
        register_functions(self)?;
        let mut stmt = self.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if names.is_empty() {
            return Err(EngineError::UnknownTable(table.to_string()));
        }
        Ok(names)
    }

    fn select(&self, selection: &Selection<'_>) -> Result<Vec<SourceRow>> {
        let (sql, params) = render(selection);
        trace!(sql = %sql, params = ?params, "Executing selection");

        let width = selection.columns.len();
        let mut stmt = self.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(cell_text))
                    .collect::<rusqlite::Result<SourceRow>>()
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
