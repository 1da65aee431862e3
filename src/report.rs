use chrono::NaiveDateTime;
use serde::Serialize;

use crate::schema::ReportScope;

pub const REPORT_HEADER: [&str; 4] = ["User", "Category", "Item", "Quantity"];

/// Column width hints for spreadsheet renderers.
pub const COLUMN_WIDTHS: [u32; 4] = [20, 25, 35, 15];

/// One input row, already ordered by (owner, category, item) upstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub owner: String,
    pub category: String,
    pub item: String,
    pub quantity: f64,
}

/// Inclusive range of data-row indices (0-based) sharing one column value,
/// for the renderer's cell-merge annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowSpan {
    pub first: usize,
    pub last: usize,
}

/// One output row. `owner` and `category` carry a value only on the first
/// row of their run; `item` and `quantity` are present unconditionally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedRow {
    pub owner: Option<String>,
    pub category: Option<String>,
    pub item: String,
    pub quantity: f64,
}

/// The report builder's contract: ordered rows plus independent run-length
/// span annotations on the owner and category columns. Output format and
/// column sizing are the rendering collaborator's concern; `to_csv` and
/// `to_markdown` are provided as plain-text renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedTable {
    pub title: String,
    pub rows: Vec<GroupedRow>,
    pub owner_spans: Vec<RowSpan>,
    pub category_spans: Vec<RowSpan>,
}

impl GroupedTable {
    /// Groups an ordered row sequence.
    ///
    /// Owner runs and category runs are tracked independently: a category
    /// change ends its own run even mid-way through an owner run, and a
    /// category run continues across an owner boundary when the value is
    /// unchanged. The final run of each column is closed once at the end
    /// using the true last row index.
    pub fn from_rows(title: impl Into<String>, rows: &[ReportRow]) -> Self {
        let mut grouped = Vec::with_capacity(rows.len());
        let mut owner_spans = Vec::new();
        let mut category_spans = Vec::new();
        let mut owner_start = 0;
        let mut category_start = 0;

        for (idx, row) in rows.iter().enumerate() {
            let owner_run_starts = idx == 0 || rows[idx - 1].owner != row.owner;
            let category_run_starts = idx == 0 || rows[idx - 1].category != row.category;

            if owner_run_starts && idx > 0 {
                owner_spans.push(RowSpan {
                    first: owner_start,
                    last: idx - 1,
                });
                owner_start = idx;
            }
            if category_run_starts && idx > 0 {
                category_spans.push(RowSpan {
                    first: category_start,
                    last: idx - 1,
                });
                category_start = idx;
            }

            grouped.push(GroupedRow {
                owner: owner_run_starts.then(|| row.owner.clone()),
                category: category_run_starts.then(|| row.category.clone()),
                item: row.item.clone(),
                quantity: row.quantity,
            });
        }

        // Close the last run of each column; no later row will do it.
        if !rows.is_empty() {
            owner_spans.push(RowSpan {
                first: owner_start,
                last: rows.len() - 1,
            });
            category_spans.push(RowSpan {
                first: category_start,
                last: rows.len() - 1,
            });
        }

        Self {
            title: title.into(),
            rows: grouped,
            owner_spans,
            category_spans,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str(&REPORT_HEADER.join(","));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!(
                "{},{},{},{}\n",
                csv_field(row.owner.as_deref().unwrap_or("")),
                csv_field(row.category.as_deref().unwrap_or("")),
                csv_field(&row.item),
                row.quantity
            ));
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", self.title));
        output.push_str(&format!("| {} |\n", REPORT_HEADER.join(" | ")));
        output.push_str("| --- | --- | --- | --- |\n");

        for row in &self.rows {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                row.owner.as_deref().unwrap_or(""),
                row.category.as_deref().unwrap_or(""),
                row.item,
                row.quantity
            ));
        }

        output
    }
}

// Categories like "ЧАЙ, КОФЕ" carry commas, so fields are quoted when needed.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// File name stem for a rendered report: `inventory_<user>_<timestamp>` or
/// `inventory_all_<timestamp>`. The extension is the renderer's choice.
pub fn report_file_name(scope: &ReportScope, at: NaiveDateTime) -> String {
    let stamp = at.format("%Y-%m-%d_%H-%M");
    match scope {
        ReportScope::Owner(id) => format!("inventory_{}_{}", id, stamp),
        ReportScope::AllOwners => format!("inventory_all_{}", stamp),
    }
}
