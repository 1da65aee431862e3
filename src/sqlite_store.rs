use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rusqlite::{params, Connection};

use crate::error::{Result, StocktakeError};
use crate::schema::{InventoryRecord, PrincipalId, RecordId};
use crate::store::InventoryStore;

/// SQLite-backed implementation of [`InventoryStore`].
///
/// The additive upsert is pushed down into SQL, so a merge is a single atomic
/// statement; the connection mutex serializes merges across keys, which more
/// than satisfies the per-key requirement.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(storage_err)?;
        Self::init(conn)
    }

    /// Creates an in-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;

            CREATE TABLE IF NOT EXISTS inventory (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                display_name TEXT NOT NULL,
                category TEXT NOT NULL,
                name TEXT NOT NULL,
                quantity REAL NOT NULL,
                UNIQUE(owner_id, category, name)
            );
            ",
        )
        .map_err(storage_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl InventoryStore for SqliteStore {
    fn merge(
        &self,
        owner: PrincipalId,
        display_name: &str,
        category: &str,
        name: &str,
        delta: f64,
    ) -> Result<()> {
        self.lock()
            .execute(
                "INSERT INTO inventory (owner_id, display_name, category, name, quantity)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(owner_id, category, name) DO UPDATE SET
                     quantity = quantity + excluded.quantity,
                     display_name = excluded.display_name",
                params![owner, display_name, category, name, delta],
            )
            .map_err(storage_err)?;
        Ok(())
    }

    fn list(&self, owner: PrincipalId) -> Result<Vec<InventoryRecord>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(
                "SELECT owner_id, display_name, category, name, quantity
                 FROM inventory
                 WHERE owner_id = ?1
                 ORDER BY display_name, category, name",
            )
            .map_err(storage_err)?;
        let rows = stmt
            .query_map(params![owner], scan_record)
            .map_err(storage_err)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(storage_err)?);
        }
        Ok(out)
    }

    fn list_all(&self) -> Result<Vec<InventoryRecord>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(
                "SELECT owner_id, display_name, category, name, quantity
                 FROM inventory
                 ORDER BY display_name, category, name",
            )
            .map_err(storage_err)?;
        let rows = stmt.query_map([], scan_record).map_err(storage_err)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(storage_err)?);
        }
        Ok(out)
    }

    fn list_with_ids(&self, owner: PrincipalId) -> Result<Vec<(RecordId, InventoryRecord)>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, owner_id, display_name, category, name, quantity
                 FROM inventory
                 WHERE owner_id = ?1
                 ORDER BY display_name, category, name",
            )
            .map_err(storage_err)?;
        let rows = stmt
            .query_map(params![owner], |row| {
                let id: RecordId = row.get(0)?;
                Ok((
                    id,
                    InventoryRecord {
                        owner: row.get(1)?,
                        display_name: row.get(2)?,
                        category: row.get(3)?,
                        name: row.get(4)?,
                        quantity: row.get(5)?,
                    },
                ))
            })
            .map_err(storage_err)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(storage_err)?);
        }
        Ok(out)
    }

    fn delete_all(&self, owner: PrincipalId) -> Result<usize> {
        self.lock()
            .execute("DELETE FROM inventory WHERE owner_id = ?1", params![owner])
            .map_err(storage_err)
    }

    fn delete_one(&self, id: RecordId) -> Result<()> {
        let rows = self
            .lock()
            .execute("DELETE FROM inventory WHERE id = ?1", params![id])
            .map_err(storage_err)?;
        if rows == 0 {
            return Err(StocktakeError::RecordNotFound(id));
        }
        Ok(())
    }

    fn update_one(&self, id: RecordId, new_name: &str, new_quantity: f64) -> Result<()> {
        let rows = self
            .lock()
            .execute(
                "UPDATE inventory SET name = ?1, quantity = ?2 WHERE id = ?3",
                params![new_name, new_quantity, id],
            )
            .map_err(storage_err)?;
        if rows == 0 {
            return Err(StocktakeError::RecordNotFound(id));
        }
        Ok(())
    }
}

fn scan_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<InventoryRecord> {
    Ok(InventoryRecord {
        owner: row.get(0)?,
        display_name: row.get(1)?,
        category: row.get(2)?,
        name: row.get(3)?,
        quantity: row.get(4)?,
    })
}

fn storage_err(err: rusqlite::Error) -> StocktakeError {
    StocktakeError::Storage(err.to_string())
}
