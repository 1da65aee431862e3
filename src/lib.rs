//! # Stocktake Engine
//!
//! A library for collecting free-text stock counts from multiple concurrent
//! users, aggregating them per user/category/item, and building grouped,
//! spreadsheet-ready reports. It is the core of a chat-driven inventory
//! counting workflow; the chat transport (menus, message delivery, file
//! sending) is an external collaborator.
//!
//! ## Core Concepts
//!
//! - **Submission**: a multi-line text message, one `<name> <quantity>` item
//!   per line. Quantities accept `.` or `,` as the decimal separator.
//! - **Merge**: the additive upsert — re-submitting an item adds to its
//!   stored quantity instead of replacing it. Editing, by contrast,
//!   overwrites.
//! - **Session**: ephemeral per-user state tracking which category the next
//!   submission belongs to.
//! - **Grouped report**: rows ordered by (user, category, item) with
//!   run-length spans on the user and category columns, ready for a renderer
//!   to merge cells.
//!
//! ## Example
//!
//! ```rust,ignore
//! use stocktake_engine::*;
//!
//! let engine = new_in_memory_engine(CategoryCatalog::default());
//! let user = Principal::new(42, "bartender");
//!
//! engine.select_blank(&user, "alcohol")?;
//! engine.select_category(&user, "ВОДКА");
//!
//! let outcome = engine.submit_text(&user, "Ром 5\nВиски 3,5")?;
//! assert_eq!(outcome.success_count, 2);
//!
//! let report = engine.build_report(&ReportScope::AllOwners)?;
//! println!("{}", report.to_csv());
//! ```

pub mod catalog;
pub mod engine;
pub mod error;
pub mod parser;
pub mod report;
pub mod schema;
pub mod session;
pub mod store;

#[cfg(feature = "sqlite")]
pub mod sqlite_store;

pub use catalog::CategoryCatalog;
pub use engine::StocktakeEngine;
pub use error::{Result, StocktakeError};
pub use parser::{parse_line, ParsedLine};
pub use report::{
    report_file_name, GroupedRow, GroupedTable, ReportRow, RowSpan, COLUMN_WIDTHS, REPORT_HEADER,
};
pub use schema::{
    BatchOutcome, InventoryRecord, LineError, Principal, PrincipalId, RecordId, ReportScope,
};
pub use session::{Session, SessionState, SessionStore};
pub use store::{InventoryStore, MemoryStore};

#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteStore;

use log::info;

/// Engine over the in-memory store, for tests and ephemeral deployments.
pub fn new_in_memory_engine(catalog: CategoryCatalog) -> StocktakeEngine<MemoryStore> {
    info!("starting stocktake engine with in-memory store");
    StocktakeEngine::new(MemoryStore::new(), catalog)
}

/// Engine over a SQLite database at the given path, creating it on first
/// use.
#[cfg(feature = "sqlite")]
pub fn open_sqlite_engine(
    path: &std::path::Path,
    catalog: CategoryCatalog,
) -> Result<StocktakeEngine<SqliteStore>> {
    info!("starting stocktake engine with SQLite store at {:?}", path);
    Ok(StocktakeEngine::new(SqliteStore::open(path)?, catalog))
}
