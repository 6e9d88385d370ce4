//! Thin SQLite wrapper: run a statement with named, typed parameters and
//! collect an iterable result set.
//!
//! This is the only query surface the index uses. Callers never see
//! `rusqlite` statements or rows.

use std::path::Path;

use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, ToSql};

use crate::error::{Result, StoreError};

/// A dynamically typed SQLite value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Get as an integer, if this is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as a float, if this is one.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            SqlValue::Real(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as text, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as a blob, if this is one.
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            SqlValue::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Whether this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<Value> for SqlValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Integer(i) => SqlValue::Integer(i),
            Value::Real(f) => SqlValue::Real(f),
            Value::Text(s) => SqlValue::Text(s),
            Value::Blob(b) => SqlValue::Blob(b),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(i: i64) -> Self {
        SqlValue::Integer(i)
    }
}

impl From<f64> for SqlValue {
    fn from(f: f64) -> Self {
        SqlValue::Real(f)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<&[u8]> for SqlValue {
    fn from(b: &[u8]) -> Self {
        SqlValue::Blob(b.to_vec())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(b: Vec<u8>) -> Self {
        SqlValue::Blob(b)
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            SqlValue::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SqlValue::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

/// One row of a [`ResultSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<SqlValue>,
}

impl Row {
    /// Get a column by position.
    pub fn get(&self, idx: usize) -> Option<&SqlValue> {
        self.values.get(idx)
    }

    /// All values, in column order.
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

/// The collected rows of one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl ResultSet {
    /// Column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Whether the statement produced any rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Iterate over rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// The first row, if any.
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// A SQLite database handle.
pub struct SqliteDb {
    conn: Connection,
}

impl SqliteDb {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Run one statement with named parameters (`:name`) and collect its rows.
    ///
    /// Statements that produce no rows return an empty [`ResultSet`].
    pub fn exec(&self, sql: &str, params: &[(&str, SqlValue)]) -> Result<ResultSet> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let bound: Vec<(&str, &dyn ToSql)> = params
            .iter()
            .map(|(name, value)| (*name, value as &dyn ToSql))
            .collect();

        let mut rows = stmt.query(bound.as_slice())?;
        let mut collected = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                let value: Value = row.get(idx)?;
                values.push(SqlValue::from(value));
            }
            collected.push(Row { values });
        }

        Ok(ResultSet {
            columns,
            rows: collected,
        })
    }

    /// Run a batch of statements without parameters.
    pub fn exec_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Rows changed by the most recent statement.
    pub fn changes(&self) -> u64 {
        self.conn.changes()
    }

    /// Open a savepoint. It is rolled back on drop unless committed.
    pub fn savepoint(&self, name: &str) -> Result<Savepoint<'_>> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StoreError::InvalidData(format!(
                "invalid savepoint name: {:?}",
                name
            )));
        }
        self.conn.execute_batch(&format!("SAVEPOINT {}", name))?;
        Ok(Savepoint {
            db: self,
            name: name.to_string(),
            done: false,
        })
    }
}

/// A named savepoint guard.
pub struct Savepoint<'a> {
    db: &'a SqliteDb,
    name: String,
    done: bool,
}

impl Savepoint<'_> {
    /// Keep everything done since the savepoint was opened.
    ///
    /// If the release fails the savepoint is rolled back on drop.
    pub fn commit(mut self) -> Result<()> {
        self.db
            .conn
            .execute_batch(&format!("RELEASE {}", self.name))?;
        self.done = true;
        Ok(())
    }
}

impl Drop for Savepoint<'_> {
    fn drop(&mut self) {
        if !self.done {
            let sql = format!("ROLLBACK TO {0}; RELEASE {0}", self.name);
            if let Err(e) = self.db.conn.execute_batch(&sql) {
                tracing::warn!("failed to roll back savepoint {}: {}", self.name, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_table() -> SqliteDb {
        let db = SqliteDb::open_memory().unwrap();
        db.exec_batch("CREATE TABLE t (i INTEGER, r REAL, s TEXT, b BLOB)")
            .unwrap();
        db
    }

    #[test]
    fn test_exec_binds_every_type() {
        let db = db_with_table();
        db.exec(
            "INSERT INTO t (i, r, s, b) VALUES (:i, :r, :s, :b)",
            &[
                (":i", SqlValue::from(7i64)),
                (":r", SqlValue::from(1.5f64)),
                (":s", SqlValue::from("hello")),
                (":b", SqlValue::from(vec![1u8, 2, 3])),
            ],
        )
        .unwrap();
        assert_eq!(db.changes(), 1);

        let result = db.exec("SELECT i, r, s, b FROM t", &[]).unwrap();
        assert_eq!(result.columns(), &["i", "r", "s", "b"]);
        assert_eq!(result.len(), 1);

        let row = result.first().unwrap();
        assert_eq!(row.get(0).and_then(SqlValue::as_integer), Some(7));
        assert_eq!(row.get(1).and_then(SqlValue::as_real), Some(1.5));
        assert_eq!(row.get(2).and_then(SqlValue::as_text), Some("hello"));
        assert_eq!(row.get(3).and_then(SqlValue::as_blob), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_exec_null_and_empty_result() {
        let db = db_with_table();
        db.exec("INSERT INTO t (i) VALUES (:i)", &[(":i", SqlValue::Null)])
            .unwrap();

        let result = db
            .exec("SELECT i FROM t WHERE i IS NULL", &[])
            .unwrap();
        assert!(result.first().unwrap().get(0).unwrap().is_null());

        let empty = db
            .exec("SELECT i FROM t WHERE s = :s", &[(":s", SqlValue::from("missing"))])
            .unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.column_index("i"), Some(0));
    }

    #[test]
    fn test_unknown_parameter_is_error() {
        let db = db_with_table();
        let result = db.exec("SELECT i FROM t WHERE i = :i", &[(":nope", SqlValue::from(1i64))]);
        assert!(result.is_err());
    }

    #[test]
    fn test_savepoint_rolls_back_on_drop() {
        let db = db_with_table();
        {
            let _sp = db.savepoint("insert_one").unwrap();
            db.exec("INSERT INTO t (i) VALUES (1)", &[]).unwrap();
        }
        assert!(db.exec("SELECT i FROM t", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_savepoint_commit_keeps_changes() {
        let db = db_with_table();
        let sp = db.savepoint("insert_one").unwrap();
        db.exec("INSERT INTO t (i) VALUES (1)", &[]).unwrap();
        sp.commit().unwrap();

        assert_eq!(db.exec("SELECT i FROM t", &[]).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_commit_rolls_back() {
        let db = SqliteDb::open_memory().unwrap();
        db.exec_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE parent (id INTEGER PRIMARY KEY);
             CREATE TABLE child (
                 parent_id INTEGER REFERENCES parent(id) DEFERRABLE INITIALLY DEFERRED
             );",
        )
        .unwrap();

        let sp = db.savepoint("orphan").unwrap();
        db.exec("INSERT INTO child (parent_id) VALUES (1)", &[]).unwrap();
        assert!(sp.commit().is_err());

        // Orphan gone, no transaction left open
        assert!(db.exec("SELECT parent_id FROM child", &[]).unwrap().is_empty());
        db.exec_batch("BEGIN; COMMIT").unwrap();
    }

    #[test]
    fn test_savepoint_name_is_checked() {
        let db = db_with_table();
        assert!(db.savepoint("x; DROP TABLE t").is_err());
        assert!(db.savepoint("").is_err());
    }
}
