// ── Transaction domain type ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A purchase (vignette, crossing package) made through the portal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub series: Option<String>,
    /// Total including VAT, in RON. Zero when the portal omitted it.
    pub total_with_vat: f64,
    /// Remaining portal fields, untouched.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Sum of `total_with_vat` over `transactions`.
pub fn total_paid(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(|t| t.total_with_vat).sum()
}
