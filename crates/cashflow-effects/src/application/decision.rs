//! Card decisions for AI-controlled players.

use crate::domain::collaborators::Choice;
use crate::domain::descriptors::EffectDescriptor;

/// What an AI player does with a presented card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Apply the card as-is.
    Confirm,
    /// Pick one side of a sell/keep card.
    Choose(Choice),
}

/// Decides cards without user input.
pub trait DecisionPolicy: Send + Sync {
    /// Returns the decision for `descriptor`. Must be deterministic.
    fn decide(&self, descriptor: &EffectDescriptor) -> Decision;
}

/// Sells when the lump sum beats a number of months of the rent increase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaybackPolicy {
    /// Months of rent increase the sale price has to beat.
    pub payback_months: f64,
}

impl Default for PaybackPolicy {
    fn default() -> Self {
        Self {
            payback_months: 12.0,
        }
    }
}

impl DecisionPolicy for PaybackPolicy {
    fn decide(&self, descriptor: &EffectDescriptor) -> Decision {
        if !descriptor.is_choice() {
            return Decision::Confirm;
        }
        let year_of_rent = descriptor.rental_increase_amount * self.payback_months;
        if descriptor.one_time_cash_amount > year_of_rent {
            Decision::Choose(Choice::Sell)
        } else {
            Decision::Choose(Choice::Keep)
        }
    }
}
