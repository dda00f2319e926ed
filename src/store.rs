//! The backing tabular store.
//!
//! The chat core consumes only [`Store::fetch_all`]: one bulk read of raw,
//! untyped records. Typing, cleaning and caching happen in the loader. The
//! import tool additionally uses [`SqliteStore::replace_all`] to swap the
//! whole dataset in one transaction.

use std::collections::HashMap;
use std::path::PathBuf;

use rusqlite::Connection;
use rusqlite::types::ValueRef;
use thiserror::Error;

/// One raw record: column name to raw text value. Any subset of expected
/// columns may be absent.
pub type RawRecord = HashMap<String, String>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub trait Store: Send + Sync {
    /// Fetch every record in the store.
    fn fetch_all(&self) -> Result<Vec<RawRecord>, StoreError>;
}

/// SQLite-backed store. The connection is opened per call; the loader's
/// memoization keeps this to one query per process lifetime.
pub struct SqliteStore {
    path: PathBuf,
}

const TABLE: &str = "orders";

impl SqliteStore {
    pub fn open(path: impl Into<PathBuf>) -> SqliteStore {
        SqliteStore { path: path.into() }
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::Unavailable(format!("no database at {}", self.path.display())));
        }
        Ok(Connection::open(&self.path)?)
    }

    /// Number of records currently stored; zero when the table is missing.
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.connect()?;
        let count = conn
            .query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |row| row.get::<_, i64>(0))
            .unwrap_or(0);
        Ok(count as usize)
    }

    /// Replace the entire store contents in one transaction. Rows must have
    /// exactly one value per column.
    pub fn replace_all(
        &self,
        columns: &[String],
        rows: &[Vec<String>],
    ) -> Result<usize, StoreError> {
        let mut conn = Connection::open(&self.path)?;
        let tx = conn.transaction()?;
        tx.execute(&format!("DROP TABLE IF EXISTS {TABLE}"), [])?;

        let column_defs =
            columns.iter().map(|c| format!("{} TEXT", quote_ident(c))).collect::<Vec<_>>().join(", ");
        tx.execute(&format!("CREATE TABLE {TABLE} ({column_defs})"), [])?;

        let column_list =
            columns.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ");
        let placeholders = vec!["?"; columns.len()].join(", ");
        {
            let mut stmt =
                tx.prepare(&format!("INSERT INTO {TABLE} ({column_list}) VALUES ({placeholders})"))?;
            for row in rows {
                stmt.execute(rusqlite::params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }
}

// Column names carry spaces ("Supplier Name"), so every identifier is quoted.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl Store for SqliteStore {
    fn fetch_all(&self) -> Result<Vec<RawRecord>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("SELECT * FROM {TABLE}"))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut records = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut record = RawRecord::new();
            for (i, column) in columns.iter().enumerate() {
                let value = match row.get_ref(i)? {
                    ValueRef::Null => continue,
                    ValueRef::Integer(v) => v.to_string(),
                    ValueRef::Real(v) => v.to_string(),
                    ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
                    ValueRef::Blob(_) => continue,
                };
                record.insert(column.clone(), value);
            }
            records.push(record);
        }
        Ok(records)
    }
}

/// In-memory store used by fixtures and tests.
pub struct StaticStore {
    records: Vec<RawRecord>,
}

impl StaticStore {
    pub fn new(records: Vec<RawRecord>) -> StaticStore {
        StaticStore { records }
    }
}

impl Store for StaticStore {
    fn fetch_all(&self) -> Result<Vec<RawRecord>, StoreError> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_all_then_fetch_all_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("orders.db"));

        let columns = vec!["Supplier Name".to_string(), "Total Price".to_string()];
        let rows = vec![
            vec!["Acme".to_string(), "$100.00".to_string()],
            vec!["Globex".to_string(), "200".to_string()],
        ];
        assert_eq!(store.replace_all(&columns, &rows).unwrap(), 2);
        assert_eq!(store.count().unwrap(), 2);

        let records = store.fetch_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Supplier Name").map(String::as_str), Some("Acme"));
        assert_eq!(records[1].get("Total Price").map(String::as_str), Some("200"));
    }

    #[test]
    fn replace_all_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("orders.db"));
        let columns = vec!["Item Name".to_string()];

        store.replace_all(&columns, &[vec!["Paper".to_string()]]).unwrap();
        store.replace_all(&columns, &[vec!["Pens".to_string()], vec!["Ink".to_string()]]).unwrap();

        let records = store.fetch_all().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.get("Item Name").map(String::as_str) != Some("Paper")));
    }

    #[test]
    fn missing_database_is_unavailable() {
        let store = SqliteStore::open("/nonexistent/orders.db");
        assert!(matches!(store.fetch_all(), Err(StoreError::Unavailable(_))));
    }
}
