//! The board: a ring of spaces the tokens walk around.

use cashflow_core::error::DomainError;
use cashflow_ledger::domain::ledger::AssetCategory;

/// A purchasable asset printed on a board space.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDeed {
    /// Asset name; also the income label once owned.
    pub name: String,
    /// Real estate or business.
    pub category: AssetCategory,
    /// Purchase price.
    pub price: f64,
    /// Monthly income once owned.
    pub monthly_income: f64,
}

impl PropertyDeed {
    /// A deed for sale.
    #[must_use]
    pub fn new(name: &str, category: AssetCategory, price: f64, monthly_income: f64) -> Self {
        Self {
            name: name.to_owned(),
            category,
            price,
            monthly_income,
        }
    }
}

/// One board space.
#[derive(Debug, Clone, PartialEq)]
pub enum Space {
    /// Passing or landing pays the player's monthly cash flow.
    Payday,
    /// Draws an effect card.
    Card,
    /// Opens the stock-market mini-game.
    Market,
    /// An asset for sale.
    Property(PropertyDeed),
}

/// Ring of spaces; position 0 follows the last space.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    spaces: Vec<Space>,
}

impl Board {
    /// Creates a board.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if `spaces` is empty.
    pub fn new(spaces: Vec<Space>) -> Result<Self, DomainError> {
        if spaces.is_empty() {
            return Err(DomainError::Configuration(
                "a board needs at least one space".to_owned(),
            ));
        }
        Ok(Self { spaces })
    }

    /// The default sixteen-space board.
    #[must_use]
    pub fn standard() -> Self {
        use AssetCategory::{Business, RealEstate};
        let property = |name, category, price, income| {
            Space::Property(PropertyDeed::new(name, category, price, income))
        };

        Self {
            spaces: vec![
                Space::Payday,
                property("RealEstate01", RealEstate, 3000.0, 150.0),
                Space::Card,
                property("Corner Bakery", Business, 8000.0, 450.0),
                property("RealEstate02", RealEstate, 4000.0, 200.0),
                Space::Market,
                Space::Card,
                property("RealEstate12", RealEstate, 12_000.0, 700.0),
                Space::Payday,
                property("RealEstate05", RealEstate, 4500.0, 250.0),
                Space::Card,
                property("Laundromat", Business, 6000.0, 300.0),
                Space::Market,
                property("RealEstate14", RealEstate, 15_000.0, 900.0),
                Space::Card,
                property("RealEstate08", RealEstate, 3500.0, 180.0),
            ],
        }
    }

    /// Number of spaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    /// Always false; boards are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    /// The space at `position`, wrapping around the ring.
    #[must_use]
    pub fn space(&self, position: usize) -> &Space {
        &self.spaces[position % self.spaces.len()]
    }

    /// The position one step ahead of `position`.
    #[must_use]
    pub fn next(&self, position: usize) -> usize {
        (position + 1) % self.spaces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_is_rejected() {
        assert!(matches!(
            Board::new(vec![]),
            Err(DomainError::Configuration(_))
        ));
    }

    #[test]
    fn test_positions_wrap_around_the_ring() {
        // Act
        let board = Board::new(vec![Space::Payday, Space::Card, Space::Market]).unwrap();

        // Assert
        assert_eq!(board.next(1), 2);
        assert_eq!(board.next(2), 0);
        assert_eq!(board.space(4), &Space::Card);
    }

    #[test]
    fn test_standard_board_starts_on_payday_and_has_unique_deeds() {
        let board = Board::standard();
        let mut names: Vec<&str> = (0..board.len())
            .filter_map(|i| match board.space(i) {
                Space::Property(deed) => Some(deed.name.as_str()),
                _ => None,
            })
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();

        assert_eq!(board.space(0), &Space::Payday);
        assert_eq!(names.len(), total);
        assert!(total >= 8);
    }
}
