//! Query handlers for the ledger.
//!
//! Builds read-only, serializable views for reports and logs.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::ledger::{AssetCategory, FinancialItem, Ledger};

/// Owned names in one asset category.
#[derive(Debug, Serialize)]
pub struct AssetGroupView {
    /// The category.
    pub category: AssetCategory,
    /// Owned names, in acquisition order.
    pub names: Vec<String>,
}

/// Read-only view of a ledger.
#[derive(Debug, Serialize)]
pub struct LedgerView {
    /// The owning player.
    pub player_id: Uuid,
    /// Income items.
    pub income: Vec<FinancialItem>,
    /// Expense items.
    pub expenses: Vec<FinancialItem>,
    /// Sum of income.
    pub total_income: f64,
    /// Sum of expenses.
    pub total_expenses: f64,
    /// Income minus expenses.
    pub net_cash_flow: f64,
    /// Non-empty asset groups.
    pub assets: Vec<AssetGroupView>,
}

/// Snapshots `ledger`.
#[must_use]
pub fn ledger_view(ledger: &Ledger) -> LedgerView {
    let assets = AssetCategory::ALL
        .into_iter()
        .filter(|category| !ledger.assets(*category).is_empty())
        .map(|category| AssetGroupView {
            category,
            names: ledger.assets(category).to_vec(),
        })
        .collect();

    LedgerView {
        player_id: ledger.player_id(),
        income: ledger.income_items().to_vec(),
        expenses: ledger.expense_items().to_vec(),
        total_income: ledger.total_income(),
        total_expenses: ledger.total_expenses(),
        net_cash_flow: ledger.net_cash_flow(),
        assets,
    }
}
