use log::{debug, error, info};

use crate::catalog::CategoryCatalog;
use crate::error::{Result, StocktakeError};
use crate::parser::parse_line;
use crate::report::{GroupedTable, ReportRow};
use crate::schema::{BatchOutcome, InventoryRecord, LineError, Principal, RecordId, ReportScope};
use crate::session::{SessionState, SessionStore};
use crate::store::InventoryStore;

/// The session-scoped input engine: routes raw text batches through the
/// parser into the store and owns all session state transitions.
///
/// Methods take `&self`; the store and the session store use interior
/// mutability, so one engine value can be shared across the transport's
/// worker tasks. Serializing transitions per principal is the transport's
/// job.
pub struct StocktakeEngine<S> {
    store: S,
    sessions: SessionStore,
    catalog: CategoryCatalog,
}

impl<S: InventoryStore> StocktakeEngine<S> {
    pub fn new(store: S, catalog: CategoryCatalog) -> Self {
        Self {
            store,
            sessions: SessionStore::new(),
            catalog,
        }
    }

    /// The user picked a count sheet. Returns the categories to offer.
    pub fn select_blank(&self, principal: &Principal, blank_type: &str) -> Result<Vec<String>> {
        let categories = self
            .catalog
            .categories(blank_type)
            .ok_or_else(|| StocktakeError::UnknownBlank(blank_type.to_string()))?
            .to_vec();

        self.sessions
            .update(principal.id, |s| s.select_blank(blank_type));
        Ok(categories)
    }

    /// The user picked a category. The label is opaque to the engine and is
    /// deliberately not validated against the catalog.
    pub fn select_category(&self, principal: &Principal, category: &str) {
        self.sessions
            .update(principal.id, |s| s.select_category(category));
    }

    /// Processes one multi-line submission.
    ///
    /// Every line is parsed and merged independently; failing lines are
    /// collected into the outcome instead of aborting the batch. The session
    /// returns to idle regardless of the result — submitting again requires
    /// re-selecting a category.
    pub fn submit_text(&self, principal: &Principal, raw_text: &str) -> Result<BatchOutcome> {
        let session = self.sessions.snapshot(principal.id);
        if session.state != SessionState::AwaitingItemText {
            return Err(StocktakeError::NoCategorySelected);
        }
        let category = session.category.ok_or(StocktakeError::NoCategorySelected)?;

        let mut outcome = BatchOutcome::default();
        for (idx, line) in raw_text.trim().lines().enumerate() {
            let line_no = idx + 1;
            match parse_line(line) {
                Ok(item) => {
                    match self.store.merge(
                        principal.id,
                        &principal.display_name,
                        &category,
                        &item.name,
                        item.quantity,
                    ) {
                        Ok(()) => {
                            debug!(
                                "merged {} x{} into '{}' for user {}",
                                item.name, item.quantity, category, principal.id
                            );
                            outcome.success_count += 1;
                        }
                        Err(err) => {
                            error!("storage failure on line {}: {}", line_no, err);
                            outcome.errors.push(LineError {
                                line_no,
                                line: line.trim().to_string(),
                                error: err,
                            });
                        }
                    }
                }
                Err(err) => outcome.errors.push(LineError {
                    line_no,
                    line: line.trim().to_string(),
                    error: err,
                }),
            }
        }

        info!(
            "user {} submitted {} lines into '{}': {} merged, {} failed",
            principal.id,
            outcome.success_count + outcome.errors.len(),
            category,
            outcome.success_count,
            outcome.errors.len()
        );

        self.sessions.reset(principal.id);
        Ok(outcome)
    }

    /// The user picked one of their records for editing.
    pub fn begin_edit(&self, principal: &Principal, record_id: RecordId) -> Result<()> {
        let owned = self
            .store
            .list_with_ids(principal.id)?
            .iter()
            .any(|(id, _)| *id == record_id);
        if !owned {
            return Err(StocktakeError::RecordNotFound(record_id));
        }

        self.sessions.update(principal.id, |s| s.begin_edit(record_id));
        Ok(())
    }

    /// One edit attempt: parses a single `<name> <quantity>` pair and
    /// overwrites (not merges) the target record. Success or failure, the
    /// session lands back in idle.
    pub fn submit_edit(&self, principal: &Principal, raw_text: &str) -> Result<()> {
        let session = self.sessions.snapshot(principal.id);
        if session.state != SessionState::AwaitingEditText {
            return Err(StocktakeError::NoEditTarget);
        }
        let target = session.edit_target.ok_or(StocktakeError::NoEditTarget)?;

        // Single attempt: idle again whatever happens next.
        self.sessions.reset(principal.id);

        let parsed = parse_line(raw_text.trim())?;
        self.store.update_one(target, &parsed.name, parsed.quantity)?;
        info!(
            "user {} rewrote record {} to '{}' x{}",
            principal.id, target, parsed.name, parsed.quantity
        );
        Ok(())
    }

    /// Removes every record owned by the principal. Independent of session
    /// state and leaves it untouched.
    pub fn clear(&self, principal: &Principal) -> Result<usize> {
        let deleted = self.store.delete_all(principal.id)?;
        info!("user {} cleared {} records", principal.id, deleted);
        Ok(deleted)
    }

    /// Forces the session back to idle from any state.
    pub fn cancel(&self, principal: &Principal) {
        self.sessions.reset(principal.id);
    }

    pub fn delete_record(&self, principal: &Principal, record_id: RecordId) -> Result<()> {
        let owned = self
            .store
            .list_with_ids(principal.id)?
            .iter()
            .any(|(id, _)| *id == record_id);
        if !owned {
            return Err(StocktakeError::RecordNotFound(record_id));
        }
        self.store.delete_one(record_id)
    }

    /// The principal's records with ids, for the transport's edit/delete
    /// menus.
    pub fn records_for_menu(&self, principal: &Principal) -> Result<Vec<(RecordId, InventoryRecord)>> {
        self.store.list_with_ids(principal.id)
    }

    pub fn build_report(&self, scope: &ReportScope) -> Result<GroupedTable> {
        let (title, records) = match scope {
            ReportScope::Owner(id) => (format!("stocktake_user_{}", id), self.store.list(*id)?),
            ReportScope::AllOwners => ("stocktake_all".to_string(), self.store.list_all()?),
        };

        let rows: Vec<ReportRow> = records
            .into_iter()
            .map(|r| ReportRow {
                owner: r.display_name,
                category: r.category,
                item: r.name,
                quantity: r.quantity,
            })
            .collect();

        info!("built report '{}' with {} rows", title, rows.len());
        Ok(GroupedTable::from_rows(title, &rows))
    }

    pub fn session_state(&self, principal: &Principal) -> SessionState {
        self.sessions.snapshot(principal.id).state
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
