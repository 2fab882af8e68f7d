use crate::error::{Result, SqlStoreError};
use analyst_protocol::{ExecutionResult, Row};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;

pub const DEFAULT_ROW_LIMIT: usize = 1000;

/// Runs query text against the relational store.
///
/// `execute` never fails: every database error is reported as `success = false` with the
/// error text, which the repair loop classifies.
pub trait QueryExecutor: Send + Sync {
    fn execute(&self, sql: &str) -> ExecutionResult;

    fn table_names(&self) -> Result<Vec<String>>;
}

pub struct SqliteExecutor {
    conn: Mutex<Connection>,
    row_limit: usize,
}

impl SqliteExecutor {
    /// Opens an existing database read-only.
    pub fn open(path: impl AsRef<Path>, row_limit: usize) -> Result<Self> {
        let path = path.as_ref();
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|source| {
            SqlStoreError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        // Opening is lazy; touch the schema so a non-database file fails here.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|source| SqlStoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("Opened {} (read-only)", path.display());
        Ok(Self::from_connection(conn, row_limit))
    }

    #[must_use]
    pub fn from_connection(conn: Connection, row_limit: usize) -> Self {
        Self {
            conn: Mutex::new(conn),
            row_limit: row_limit.max(1),
        }
    }

    fn run(&self, sql: &str) -> Result<ExecutionResult> {
        let conn = self.conn.lock().map_err(|_| SqlStoreError::Poisoned)?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt.query([])?;
        let mut out: Vec<Row> = Vec::new();
        while let Some(row) = rows.next()? {
            if out.len() >= self.row_limit {
                log::debug!("Row limit {} reached, truncating", self.row_limit);
                break;
            }
            let mut record = Row::new();
            for (idx, name) in columns.iter().enumerate() {
                record.insert(name.clone(), value_to_json(row.get_ref(idx)?));
            }
            out.push(record);
        }

        Ok(ExecutionResult::ok(columns, out))
    }
}

impl QueryExecutor for SqliteExecutor {
    fn execute(&self, sql: &str) -> ExecutionResult {
        if sql.trim().is_empty() {
            return ExecutionResult::failed("empty query");
        }
        match self.run(sql) {
            Ok(result) => {
                log::debug!("Query returned {} rows", result.rows.len());
                result
            }
            Err(err) => {
                let message = match err {
                    SqlStoreError::Sqlite(inner) => inner.to_string(),
                    other => other.to_string(),
                };
                log::debug!("Query failed: {message}");
                ExecutionResult::failed(message)
            }
        }
    }

    fn table_names(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().map_err(|_| SqlStoreError::Poisoned)?;
        let mut stmt =
            conn.prepare("SELECT name FROM sqlite_master WHERE type='table'")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Short description of the available tables, handed to query drafting.
#[must_use]
pub fn schema_hint(tables: &[String]) -> String {
    format!("Available tables: {}", tables.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn executor() -> SqliteExecutor {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE Categories (CategoryID INTEGER PRIMARY KEY, CategoryName TEXT);
            CREATE TABLE "Order Details" (OrderID INTEGER, ProductID INTEGER, UnitPrice REAL, Quantity INTEGER, Discount REAL);
            INSERT INTO Categories VALUES (1, 'Beverages'), (2, 'Condiments'), (3, NULL);
            "#,
        )
        .unwrap();
        SqliteExecutor::from_connection(conn, 2)
    }

    #[test]
    fn rows_keep_select_order_and_types() {
        let result = executor().execute(
            "SELECT CategoryName AS category, CategoryID * 1.5 AS weight, CategoryID AS id FROM Categories ORDER BY CategoryID;",
        );
        assert!(result.success);
        assert_eq!(result.columns, vec!["category", "weight", "id"]);
        assert_eq!(
            serde_json::to_value(&result.rows[0]).unwrap(),
            json!({"category": "Beverages", "weight": 1.5, "id": 1})
        );
        let keys: Vec<&str> = result.rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["category", "weight", "id"]);
    }

    #[test]
    fn row_limit_truncates() {
        let result = executor().execute("SELECT * FROM Categories;");
        assert!(result.success);
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn errors_are_reported_not_raised() {
        let result = executor().execute("SELECT * FROM OrderDetails;");
        assert!(!result.success);
        assert!(result.rows.is_empty());
        let error = result.error.unwrap();
        assert!(error.contains("no such table"), "{error}");

        let result = executor().execute("   ");
        assert_eq!(result.error.as_deref(), Some("empty query"));
    }

    #[test]
    fn lists_tables_and_builds_hint() {
        let tables = executor().table_names().unwrap();
        assert_eq!(tables, vec!["Categories", "Order Details"]);
        assert_eq!(
            schema_hint(&tables),
            "Available tables: Categories, Order Details"
        );
    }
}
