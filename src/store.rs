use std::sync::{Mutex, PoisonError};

use crate::error::{Result, StocktakeError};
use crate::schema::{InventoryRecord, PrincipalId, RecordId};

/// Storage contract for aggregated inventory records.
///
/// Records are keyed by (owner, category, name); `merge` is the additive
/// upsert at the heart of the engine. Implementations must serialize merges
/// per key so no update is lost — guarding the whole store with a mutex
/// satisfies this. List operations return rows ordered by
/// (display_name, category, name); the report builder relies on that ordering
/// being done here, not downstream.
pub trait InventoryStore: Send + Sync {
    /// Inserts a new record with `quantity = delta`, or adds `delta` to the
    /// existing record's quantity and refreshes its display name.
    fn merge(
        &self,
        owner: PrincipalId,
        display_name: &str,
        category: &str,
        name: &str,
        delta: f64,
    ) -> Result<()>;

    fn list(&self, owner: PrincipalId) -> Result<Vec<InventoryRecord>>;

    fn list_all(&self) -> Result<Vec<InventoryRecord>>;

    /// Rows with their surrogate ids, for the transport's edit/delete menus.
    fn list_with_ids(&self, owner: PrincipalId) -> Result<Vec<(RecordId, InventoryRecord)>>;

    /// Removes every record owned by the principal, returning how many were
    /// deleted.
    fn delete_all(&self, owner: PrincipalId) -> Result<usize>;

    fn delete_one(&self, id: RecordId) -> Result<()>;

    /// Overwrites (not merges) the record's name and quantity.
    fn update_one(&self, id: RecordId, new_name: &str, new_quantity: f64) -> Result<()>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    next_id: RecordId,
    rows: Vec<(RecordId, InventoryRecord)>,
}

/// In-memory store for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn report_order(a: &InventoryRecord, b: &InventoryRecord) -> std::cmp::Ordering {
    (&a.display_name, &a.category, &a.name).cmp(&(&b.display_name, &b.category, &b.name))
}

impl InventoryStore for MemoryStore {
    fn merge(
        &self,
        owner: PrincipalId,
        display_name: &str,
        category: &str,
        name: &str,
        delta: f64,
    ) -> Result<()> {
        let mut inner = self.lock();

        if let Some((_, record)) = inner
            .rows
            .iter_mut()
            .find(|(_, r)| r.owner == owner && r.category == category && r.name == name)
        {
            record.quantity += delta;
            record.display_name = display_name.to_string();
            return Ok(());
        }

        inner.next_id += 1;
        let id = inner.next_id;
        inner.rows.push((
            id,
            InventoryRecord {
                owner,
                display_name: display_name.to_string(),
                category: category.to_string(),
                name: name.to_string(),
                quantity: delta,
            },
        ));
        Ok(())
    }

    fn list(&self, owner: PrincipalId) -> Result<Vec<InventoryRecord>> {
        let mut records: Vec<InventoryRecord> = self
            .lock()
            .rows
            .iter()
            .filter(|(_, r)| r.owner == owner)
            .map(|(_, r)| r.clone())
            .collect();
        records.sort_by(report_order);
        Ok(records)
    }

    fn list_all(&self) -> Result<Vec<InventoryRecord>> {
        let mut records: Vec<InventoryRecord> =
            self.lock().rows.iter().map(|(_, r)| r.clone()).collect();
        records.sort_by(report_order);
        Ok(records)
    }

    fn list_with_ids(&self, owner: PrincipalId) -> Result<Vec<(RecordId, InventoryRecord)>> {
        let mut records: Vec<(RecordId, InventoryRecord)> = self
            .lock()
            .rows
            .iter()
            .filter(|(_, r)| r.owner == owner)
            .cloned()
            .collect();
        records.sort_by(|(_, a), (_, b)| report_order(a, b));
        Ok(records)
    }

    fn delete_all(&self, owner: PrincipalId) -> Result<usize> {
        let mut inner = self.lock();
        let before = inner.rows.len();
        inner.rows.retain(|(_, r)| r.owner != owner);
        Ok(before - inner.rows.len())
    }

    fn delete_one(&self, id: RecordId) -> Result<()> {
        let mut inner = self.lock();
        let before = inner.rows.len();
        inner.rows.retain(|(row_id, _)| *row_id != id);
        if inner.rows.len() == before {
            return Err(StocktakeError::RecordNotFound(id));
        }
        Ok(())
    }

    fn update_one(&self, id: RecordId, new_name: &str, new_quantity: f64) -> Result<()> {
        let mut inner = self.lock();

        let target = inner
            .rows
            .iter()
            .find(|(row_id, _)| *row_id == id)
            .map(|(_, r)| (r.owner, r.category.clone()))
            .ok_or(StocktakeError::RecordNotFound(id))?;

        // The (owner, category, name) key stays unique, as the SQLite schema
        // would enforce.
        let collides = inner.rows.iter().any(|(row_id, r)| {
            *row_id != id && r.owner == target.0 && r.category == target.1 && r.name == new_name
        });
        if collides {
            return Err(StocktakeError::Storage(format!(
                "UNIQUE constraint failed: a record named '{}' already exists in '{}'",
                new_name, target.1
            )));
        }

        if let Some((_, record)) = inner.rows.iter_mut().find(|(row_id, _)| *row_id == id) {
            record.name = new_name.to_string();
            record.quantity = new_quantity;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_additive_per_key() {
        let store = MemoryStore::new();
        store.merge(1, "anna", "ВОДКА", "Ром", 5.0).unwrap();
        store.merge(1, "anna", "ВОДКА", "Ром", 2.5).unwrap();

        let records = store.list(1).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].quantity, 7.5);
    }

    #[test]
    fn test_merge_refreshes_display_name() {
        let store = MemoryStore::new();
        store.merge(1, "anna", "ВОДКА", "Ром", 5.0).unwrap();
        store.merge(1, "anna_renamed", "ВОДКА", "Ром", 1.0).unwrap();

        let records = store.list(1).unwrap();
        assert_eq!(records[0].display_name, "anna_renamed");
    }

    #[test]
    fn test_different_keys_do_not_merge() {
        let store = MemoryStore::new();
        store.merge(1, "anna", "ВОДКА", "Ром", 5.0).unwrap();
        store.merge(1, "anna", "РОМ", "Ром", 3.0).unwrap();
        store.merge(2, "boris", "ВОДКА", "Ром", 1.0).unwrap();

        assert_eq!(store.list(1).unwrap().len(), 2);
        assert_eq!(store.list_all().unwrap().len(), 3);
    }

    #[test]
    fn test_list_ordering() {
        let store = MemoryStore::new();
        store.merge(2, "boris", "Cat2", "Vodka", 3.0).unwrap();
        store.merge(1, "anna", "Cat2", "Vodka", 1.0).unwrap();
        store.merge(1, "anna", "Cat1", "Rom", 5.0).unwrap();
        store.merge(1, "anna", "Cat1", "Gin", 2.0).unwrap();

        let all = store.list_all().unwrap();
        let keys: Vec<(&str, &str, &str)> = all
            .iter()
            .map(|r| (r.display_name.as_str(), r.category.as_str(), r.name.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("anna", "Cat1", "Gin"),
                ("anna", "Cat1", "Rom"),
                ("anna", "Cat2", "Vodka"),
                ("boris", "Cat2", "Vodka"),
            ]
        );
    }

    #[test]
    fn test_delete_all_scoped_to_owner() {
        let store = MemoryStore::new();
        store.merge(1, "anna", "ВОДКА", "Ром", 5.0).unwrap();
        store.merge(1, "anna", "ДЖИН", "Джин", 2.0).unwrap();
        store.merge(2, "boris", "ВОДКА", "Ром", 1.0).unwrap();

        assert_eq!(store.delete_all(1).unwrap(), 2);
        assert!(store.list(1).unwrap().is_empty());
        assert_eq!(store.list(2).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_one_missing_record() {
        let store = MemoryStore::new();
        let err = store.delete_one(99).unwrap_err();
        assert!(matches!(err, StocktakeError::RecordNotFound(99)));
    }

    #[test]
    fn test_update_one_overwrites() {
        let store = MemoryStore::new();
        store.merge(1, "anna", "ВОДКА", "Ром", 5.0).unwrap();
        let (id, _) = store.list_with_ids(1).unwrap()[0].clone();

        store.update_one(id, "Ром тёмный", 4.0).unwrap();

        let records = store.list(1).unwrap();
        assert_eq!(records[0].name, "Ром тёмный");
        assert_eq!(records[0].quantity, 4.0);
    }

    #[test]
    fn test_update_one_rejects_key_collision() {
        let store = MemoryStore::new();
        store.merge(1, "anna", "ВОДКА", "Ром", 5.0).unwrap();
        store.merge(1, "anna", "ВОДКА", "Джин", 2.0).unwrap();
        let ids = store.list_with_ids(1).unwrap();
        let gin_id = ids
            .iter()
            .find(|(_, r)| r.name == "Джин")
            .map(|(id, _)| *id)
            .unwrap();

        let err = store.update_one(gin_id, "Ром", 1.0).unwrap_err();
        assert!(matches!(err, StocktakeError::Storage(_)));
    }
}
