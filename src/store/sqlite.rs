use std::fs;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use super::RecordStore;
use crate::errors::{PanelError, PanelResult};
use crate::models::Sheet;

const SCHEMA_SQL: &str = include_str!("schema.sql");

#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(path: &Path) -> PanelResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|error| PanelError::SourceUnavailable(error.to_string()))?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> PanelResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|error| PanelError::SourceUnavailable(error.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> PanelResult<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|error| PanelError::SourceRejected(error.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> PanelResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PanelError::Internal("record store mutex poisoned".to_string()))
    }
}

impl RecordStore for SqliteStore {
    fn read_all(&self) -> PanelResult<Sheet> {
        let conn = self.lock()?;

        let mut column_stmt = conn.prepare("SELECT name FROM sheet_columns ORDER BY position")?;
        let columns = column_stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut sheet = Sheet::new(columns);
        let mut row_stmt = conn.prepare("SELECT cells_json FROM sheet_rows ORDER BY position")?;
        let rows = row_stmt.query_map([], |row| row.get::<_, String>(0))?;
        for cells_json in rows {
            let cells: Vec<String> = serde_json::from_str(&cells_json?)
                .map_err(|error| PanelError::SourceRejected(format!("corrupt row: {error}")))?;
            sheet.rows.push(cells);
        }
        Ok(sheet)
    }

    fn write_all(&self, sheet: &Sheet) -> PanelResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM sheet_columns", [])?;
        tx.execute("DELETE FROM sheet_rows", [])?;
        for (position, name) in sheet.columns.iter().enumerate() {
            tx.execute(
                "INSERT INTO sheet_columns (position, name) VALUES (?1, ?2)",
                params![position as i64, name],
            )?;
        }
        for (position, cells) in sheet.rows.iter().enumerate() {
            let cells_json = serde_json::to_string(cells)?;
            tx.execute(
                "INSERT INTO sheet_rows (position, cells_json) VALUES (?1, ?2)",
                params![position as i64, cells_json],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
