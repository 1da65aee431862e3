use serde::{Deserialize, Serialize};

use crate::error::StocktakeError;

/// Opaque identity of a conversing user, assigned by the transport layer.
pub type PrincipalId = i64;

/// Surrogate row identifier used by the edit and delete flows.
pub type RecordId = i64;

/// What the transport hands the engine for every interaction: the stable id
/// plus whatever display name the user currently carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub display_name: String,
}

impl Principal {
    pub fn new(id: PrincipalId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

/// One aggregated inventory position.
///
/// Keyed by (owner, category, name); `display_name` is refreshed on every
/// merge but is not part of the key. `quantity` is signed and additive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub owner: PrincipalId,
    pub display_name: String,
    pub category: String,
    pub name: String,
    pub quantity: f64,
}

/// Which rows a report covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportScope {
    Owner(PrincipalId),
    AllOwners,
}

/// A single failed line of a batch submission, reported back to the user.
#[derive(Debug)]
pub struct LineError {
    /// 1-based position of the line within the submission.
    pub line_no: usize,
    pub line: String,
    pub error: StocktakeError,
}

/// Outcome of one multi-line submission.
///
/// `success_count` counts merged lines, not submitted lines; a batch with at
/// least one success is still a success even if other lines failed.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub success_count: usize,
    pub errors: Vec<LineError>,
}

impl BatchOutcome {
    /// True when not a single line of the submission was merged.
    pub fn all_failed(&self) -> bool {
        self.success_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serialization_round_trip() {
        let record = InventoryRecord {
            owner: 42,
            display_name: "bartender".to_string(),
            category: "ВОДКА".to_string(),
            name: "Ром".to_string(),
            quantity: 5.0,
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: InventoryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_batch_outcome_all_failed() {
        let outcome = BatchOutcome::default();
        assert!(outcome.all_failed());

        let outcome = BatchOutcome {
            success_count: 1,
            errors: Vec::new(),
        };
        assert!(!outcome.all_failed());
    }
}
