//! Scoped connection access for repositories.
//!
//! # Responsibility
//! - Define the statement-level `Cursor` contract repositories talk to.
//! - Acquire a connection for exactly one repository operation and release it
//!   on every exit path.
//!
//! # Invariants
//! - Statements are always parameterized; values never reach SQL text.
//! - A cursor's work is committed only when the operation returns `Ok`.
//! - Errors roll back everything the operation issued.

use super::{open_db, DbError, DbResult};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::path::PathBuf;

/// One result row in column order.
pub type Row = Vec<Value>;

/// Statement executor handed to a repository for the duration of one operation.
pub trait Cursor {
    /// Runs a write statement and returns the number of changed rows.
    fn execute(&mut self, sql: &str, args: &[Value]) -> DbResult<usize>;
    /// Runs a query and returns its first row, if any.
    fn fetch_one(&mut self, sql: &str, args: &[Value]) -> DbResult<Option<Row>>;
    /// Runs a query and returns every row in storage order.
    fn fetch_all(&mut self, sql: &str, args: &[Value]) -> DbResult<Vec<Row>>;
    /// Row id assigned by the most recent successful insert.
    fn last_insert_id(&self) -> i64;
}

/// Source of scoped cursors.
///
/// Implementations acquire a handle, run `op`, commit on success and roll back
/// on failure. The handle never outlives the call.
pub trait ConnectionProvider {
    fn with_cursor<T, E>(&self, op: impl FnOnce(&mut dyn Cursor) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>;
}

impl<P: ConnectionProvider> ConnectionProvider for &P {
    fn with_cursor<T, E>(&self, op: impl FnOnce(&mut dyn Cursor) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        (**self).with_cursor(op)
    }
}

/// `Cursor` over a live SQLite connection.
pub struct SqliteCursor<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCursor<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl Cursor for SqliteCursor<'_> {
    fn execute(&mut self, sql: &str, args: &[Value]) -> DbResult<usize> {
        let changed = self.conn.execute(sql, params_from_iter(args.iter()))?;
        Ok(changed)
    }

    fn fetch_one(&mut self, sql: &str, args: &[Value]) -> DbResult<Option<Row>> {
        let mut stmt = self.conn.prepare(sql)?;
        let width = stmt.column_count();
        let mut rows = stmt.query(params_from_iter(args.iter()))?;
        match rows.next()? {
            Some(row) => Ok(Some(read_row(row, width)?)),
            None => Ok(None),
        }
    }

    fn fetch_all(&mut self, sql: &str, args: &[Value]) -> DbResult<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;
        let width = stmt.column_count();
        let mut rows = stmt.query(params_from_iter(args.iter()))?;
        let mut collected = Vec::new();
        while let Some(row) = rows.next()? {
            collected.push(read_row(row, width)?);
        }
        Ok(collected)
    }

    fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }
}

fn read_row(row: &rusqlite::Row<'_>, width: usize) -> DbResult<Row> {
    let mut values = Vec::with_capacity(width);
    for index in 0..width {
        values.push(row.get::<_, Value>(index)?);
    }
    Ok(values)
}

/// A borrowed, long-lived connection acts as its own provider.
///
/// Each operation runs inside a deferred transaction on that connection, so
/// callers must not hold an open transaction of their own while using it.
impl ConnectionProvider for Connection {
    fn with_cursor<T, E>(&self, op: impl FnOnce(&mut dyn Cursor) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let tx = self.unchecked_transaction().map_err(DbError::from)?;
        let value = {
            let mut cursor = SqliteCursor::new(&tx);
            op(&mut cursor)?
        };
        tx.commit().map_err(DbError::from)?;
        Ok(value)
    }
}

/// Provider that opens the database file for every operation.
///
/// The connection is dropped as soon as the operation finishes, whether it
/// succeeded or not.
#[derive(Debug, Clone)]
pub struct SqliteProvider {
    path: PathBuf,
}

impl SqliteProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConnectionProvider for SqliteProvider {
    fn with_cursor<T, E>(&self, op: impl FnOnce(&mut dyn Cursor) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let conn = open_db(&self.path)?;
        let result = conn.with_cursor(op);
        debug!(
            "event=db_release module=db status={} path={}",
            if result.is_ok() { "ok" } else { "error" },
            self.path.display()
        );
        result
    }
}
