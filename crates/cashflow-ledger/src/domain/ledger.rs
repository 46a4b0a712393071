//! The per-player ledger.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::events::{CashFlowChanged, CashFlowObserver};

/// A labelled monthly income or expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialItem {
    /// Display label; for asset income this is the asset name.
    pub label: String,
    /// Monthly amount.
    pub amount: f64,
}

/// The five kinds of asset a player can own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetCategory {
    /// Houses, apartments, shops and offices.
    RealEstate,
    /// Operating businesses.
    Business,
    /// Listed shares bought through the market mini-game.
    Stock,
    /// Unit trust holdings.
    UnitTrust,
    /// Insurance policies.
    Insurance,
}

impl AssetCategory {
    /// Every category, in ledger order.
    pub const ALL: [Self; 5] = [
        Self::RealEstate,
        Self::Business,
        Self::Stock,
        Self::UnitTrust,
        Self::Insurance,
    ];

    fn index(self) -> usize {
        match self {
            Self::RealEstate => 0,
            Self::Business => 1,
            Self::Stock => 2,
            Self::UnitTrust => 3,
            Self::Insurance => 4,
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RealEstate => "real_estate",
            Self::Business => "business",
            Self::Stock => "stock",
            Self::UnitTrust => "unit_trust",
            Self::Insurance => "insurance",
        };
        f.write_str(name)
    }
}

fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

/// Income and expense items plus owned-asset names for one player.
///
/// Totals are always recomputed from the items. Invalid input (empty labels,
/// non-positive amounts) is ignored rather than reported.
pub struct Ledger {
    player_id: Uuid,
    income: Vec<FinancialItem>,
    expenses: Vec<FinancialItem>,
    assets: [Vec<String>; 5],
    observers: Vec<Arc<dyn CashFlowObserver>>,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("player_id", &self.player_id)
            .field("income", &self.income)
            .field("expenses", &self.expenses)
            .field("assets", &self.assets)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Ledger {
    /// Creates an empty ledger for `player_id`.
    #[must_use]
    pub fn new(player_id: Uuid) -> Self {
        Self {
            player_id,
            income: Vec::new(),
            expenses: Vec::new(),
            assets: Default::default(),
            observers: Vec::new(),
        }
    }

    /// The owning player.
    #[must_use]
    pub fn player_id(&self) -> Uuid {
        self.player_id
    }

    /// Registers an observer for cash-flow changes.
    pub fn subscribe(&mut self, observer: Arc<dyn CashFlowObserver>) {
        self.observers.push(observer);
    }

    /// Sum of all income items.
    #[must_use]
    pub fn total_income(&self) -> f64 {
        self.income.iter().map(|item| item.amount).sum()
    }

    /// Sum of all expense items.
    #[must_use]
    pub fn total_expenses(&self) -> f64 {
        self.expenses.iter().map(|item| item.amount).sum()
    }

    /// `total_income - total_expenses`.
    #[must_use]
    pub fn net_cash_flow(&self) -> f64 {
        self.total_income() - self.total_expenses()
    }

    /// Income items in insertion order.
    #[must_use]
    pub fn income_items(&self) -> &[FinancialItem] {
        &self.income
    }

    /// Expense items in insertion order.
    #[must_use]
    pub fn expense_items(&self) -> &[FinancialItem] {
        &self.expenses
    }

    /// Amount of the first income item labelled `label`.
    #[must_use]
    pub fn income_amount(&self, label: &str) -> Option<f64> {
        self.income
            .iter()
            .find(|item| item.label == label)
            .map(|item| item.amount)
    }

    /// Names owned in `category`, in the order they were added.
    #[must_use]
    pub fn assets(&self, category: AssetCategory) -> &[String] {
        &self.assets[category.index()]
    }

    /// Whether `name` is recorded under `category`.
    #[must_use]
    pub fn has_asset(&self, category: AssetCategory, name: &str) -> bool {
        self.assets(category).iter().any(|owned| owned == name)
    }

    /// Appends an income item.
    pub fn add_income(&mut self, label: &str, amount: f64) -> bool {
        if !Self::accepts(label, amount) {
            return false;
        }
        self.income.push(FinancialItem {
            label: label.to_owned(),
            amount,
        });
        self.notify();
        true
    }

    /// Appends an expense item.
    pub fn add_expense(&mut self, label: &str, amount: f64) -> bool {
        if !Self::accepts(label, amount) {
            return false;
        }
        self.expenses.push(FinancialItem {
            label: label.to_owned(),
            amount,
        });
        self.notify();
        true
    }

    /// Removes the first income item labelled `label`.
    pub fn remove_income(&mut self, label: &str) -> bool {
        let removed = remove_first(&mut self.income, label);
        if removed {
            self.notify();
        }
        removed
    }

    /// Removes the first expense item labelled `label`.
    pub fn remove_expense(&mut self, label: &str) -> bool {
        let removed = remove_first(&mut self.expenses, label);
        if removed {
            self.notify();
        }
        removed
    }

    /// Replaces the amount of the first income item labelled `label`.
    pub fn update_income(&mut self, label: &str, new_amount: f64) -> bool {
        if !Self::accepts(label, new_amount) {
            return false;
        }
        let updated = update_first(&mut self.income, label, new_amount);
        if updated {
            self.notify();
        }
        updated
    }

    /// Replaces the amount of the first expense item labelled `label`.
    pub fn update_expense(&mut self, label: &str, new_amount: f64) -> bool {
        if !Self::accepts(label, new_amount) {
            return false;
        }
        let updated = update_first(&mut self.expenses, label, new_amount);
        if updated {
            self.notify();
        }
        updated
    }

    /// Shifts the first income item labelled `label` by `delta`, flooring the
    /// result at zero. Returns the new amount, or `None` if no item matched.
    pub fn adjust_income(&mut self, label: &str, delta: f64) -> Option<f64> {
        if !delta.is_finite() {
            debug!(player_id = %self.player_id, label, "ignoring non-finite income delta");
            return None;
        }
        let item = self.income.iter_mut().find(|item| item.label == label)?;
        item.amount = (item.amount + delta).max(0.0);
        let new_amount = item.amount;
        self.notify();
        Some(new_amount)
    }

    /// Records `name` under `category`. Empty or already-present names are
    /// ignored.
    pub fn add_asset(&mut self, category: AssetCategory, name: &str) -> bool {
        if name.is_empty() || self.has_asset(category, name) {
            return false;
        }
        self.assets[category.index()].push(name.to_owned());
        true
    }

    /// Forgets `name` under `category`.
    pub fn remove_asset(&mut self, category: AssetCategory, name: &str) -> bool {
        let names = &mut self.assets[category.index()];
        match names.iter().position(|owned| owned == name) {
            Some(index) => {
                names.remove(index);
                true
            }
            None => false,
        }
    }

    /// Clears every item and asset name. Observers stay subscribed.
    pub fn reset(&mut self) {
        self.income.clear();
        self.expenses.clear();
        for names in &mut self.assets {
            names.clear();
        }
        self.notify();
    }

    fn accepts(label: &str, amount: f64) -> bool {
        if label.is_empty() || !is_valid_amount(amount) {
            debug!(label, amount, "rejecting ledger input");
            return false;
        }
        true
    }

    fn notify(&self) {
        let total_income = self.total_income();
        let total_expenses = self.total_expenses();
        let event = CashFlowChanged {
            player_id: self.player_id,
            total_income,
            total_expenses,
            net_cash_flow: total_income - total_expenses,
        };
        for observer in &self.observers {
            observer.on_cash_flow_changed(&event);
        }
    }
}

fn remove_first(items: &mut Vec<FinancialItem>, label: &str) -> bool {
    match items.iter().position(|item| item.label == label) {
        Some(index) => {
            items.remove(index);
            true
        }
        None => false,
    }
}

fn update_first(items: &mut [FinancialItem], label: &str, new_amount: f64) -> bool {
    match items.iter_mut().find(|item| item.label == label) {
        Some(item) => {
            item.amount = new_amount;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<CashFlowChanged>>);

    impl CashFlowObserver for Recorder {
        fn on_cash_flow_changed(&self, event: &CashFlowChanged) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    impl Recorder {
        fn net_values(&self) -> Vec<f64> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.net_cash_flow)
                .collect()
        }
    }

    fn ledger_with_recorder() -> (Ledger, Arc<Recorder>) {
        let mut ledger = Ledger::new(Uuid::new_v4());
        let recorder = Arc::new(Recorder::default());
        ledger.subscribe(recorder.clone());
        (ledger, recorder)
    }

    fn assert_net_consistent(ledger: &Ledger) {
        let expected = ledger.total_income() - ledger.total_expenses();
        assert!((ledger.net_cash_flow() - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn test_totals_follow_every_mutation() {
        let (mut ledger, _) = ledger_with_recorder();

        ledger.add_income("Salary", 3000.0);
        assert_net_consistent(&ledger);
        ledger.add_income("RealEstate03", 400.0);
        assert_net_consistent(&ledger);
        ledger.add_expense("Mortgage", 1200.0);
        assert_net_consistent(&ledger);
        ledger.update_income("Salary", 3500.0);
        assert_net_consistent(&ledger);
        ledger.update_expense("Mortgage", 1000.0);
        assert_net_consistent(&ledger);
        ledger.remove_income("RealEstate03");
        assert_net_consistent(&ledger);
        ledger.remove_expense("Mortgage");
        assert_net_consistent(&ledger);

        assert!((ledger.total_income() - 3500.0).abs() < f64::EPSILON);
        assert!(ledger.total_expenses().abs() < f64::EPSILON);
        assert!((ledger.net_cash_flow() - 3500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_each_item_mutation_notifies_with_fresh_net() {
        // Arrange
        let (mut ledger, recorder) = ledger_with_recorder();

        // Act
        ledger.add_income("Salary", 3000.0);
        ledger.add_expense("Car Loan", 500.0);
        ledger.update_expense("Car Loan", 250.0);
        ledger.remove_income("Salary");

        // Assert
        assert_eq!(recorder.net_values(), vec![3000.0, 2500.0, 2750.0, -250.0]);
    }

    #[test]
    fn test_asset_mutations_do_not_notify() {
        // Arrange
        let (mut ledger, recorder) = ledger_with_recorder();

        // Act
        ledger.add_asset(AssetCategory::RealEstate, "RealEstate03");
        ledger.remove_asset(AssetCategory::RealEstate, "RealEstate03");

        // Assert
        assert!(recorder.net_values().is_empty());
    }

    #[test]
    fn test_invalid_input_is_silently_rejected() {
        let (mut ledger, recorder) = ledger_with_recorder();

        assert!(!ledger.add_income("", 100.0));
        assert!(!ledger.add_income("Salary", 0.0));
        assert!(!ledger.add_expense("Tax", -5.0));
        assert!(!ledger.add_expense("Tax", f64::NAN));

        ledger.add_income("Salary", 100.0);
        assert!(!ledger.update_income("Salary", 0.0));
        assert!(!ledger.update_income("Missing", 50.0));

        assert_eq!(ledger.income_items().len(), 1);
        assert_eq!(ledger.income_amount("Salary"), Some(100.0));
        assert_eq!(recorder.net_values(), vec![100.0]);
    }

    #[test]
    fn test_remove_income_removes_first_match_only() {
        let mut ledger = Ledger::new(Uuid::new_v4());
        ledger.add_income("Dividend", 10.0);
        ledger.add_income("Dividend", 20.0);

        assert!(ledger.remove_income("Dividend"));
        assert_eq!(ledger.income_amount("Dividend"), Some(20.0));
        assert!(ledger.remove_income("Dividend"));
        assert!(!ledger.remove_income("Dividend"));
    }

    #[test]
    fn test_asset_add_is_idempotent() {
        let mut ledger = Ledger::new(Uuid::new_v4());

        assert!(ledger.add_asset(AssetCategory::Business, "Laundromat"));
        assert!(!ledger.add_asset(AssetCategory::Business, "Laundromat"));
        assert!(!ledger.add_asset(AssetCategory::Business, ""));

        assert_eq!(ledger.assets(AssetCategory::Business).len(), 1);
    }

    #[test]
    fn test_asset_categories_are_independent() {
        let mut ledger = Ledger::new(Uuid::new_v4());
        ledger.add_asset(AssetCategory::Stock, "ACME");
        ledger.add_asset(AssetCategory::UnitTrust, "ACME");

        assert!(ledger.remove_asset(AssetCategory::Stock, "ACME"));
        assert!(!ledger.remove_asset(AssetCategory::Stock, "ACME"));
        assert!(ledger.has_asset(AssetCategory::UnitTrust, "ACME"));
    }

    #[test]
    fn test_adjust_income_floors_at_zero() {
        let (mut ledger, recorder) = ledger_with_recorder();
        ledger.add_income("RealEstate03", 400.0);

        assert_eq!(ledger.adjust_income("RealEstate03", -1000.0), Some(0.0));
        assert_eq!(ledger.adjust_income("RealEstate03", 150.0), Some(150.0));
        assert_eq!(ledger.adjust_income("Missing", 10.0), None);
        assert_eq!(ledger.adjust_income("RealEstate03", f64::INFINITY), None);

        assert_eq!(recorder.net_values(), vec![400.0, 0.0, 150.0]);
    }

    #[test]
    fn test_reset_clears_everything_and_notifies_once() {
        // Arrange
        let (mut ledger, recorder) = ledger_with_recorder();
        ledger.add_income("Salary", 3000.0);
        ledger.add_expense("Rent", 800.0);
        for category in AssetCategory::ALL {
            ledger.add_asset(category, "Thing");
        }

        // Act
        ledger.reset();

        // Assert
        assert!(ledger.income_items().is_empty());
        assert!(ledger.expense_items().is_empty());
        for category in AssetCategory::ALL {
            assert!(ledger.assets(category).is_empty());
        }
        assert_eq!(recorder.net_values().last(), Some(&0.0));
        assert_eq!(recorder.net_values().len(), 3);
    }
}
