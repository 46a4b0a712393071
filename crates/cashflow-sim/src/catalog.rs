//! Card catalog loading.

use std::path::Path;

use cashflow_core::error::DomainError;
use cashflow_effects::domain::descriptors::EffectCatalog;

/// The deck shipped with the simulation.
pub const DEFAULT_CATALOG_YAML: &str = include_str!("../catalog/default.yaml");

/// Parses the built-in deck.
///
/// # Errors
///
/// Returns `DomainError::Configuration` if the bundled file is malformed.
pub fn default_catalog() -> Result<EffectCatalog, DomainError> {
    EffectCatalog::from_yaml_str(DEFAULT_CATALOG_YAML)
}

/// Loads a deck from a `.json`, `.yaml` or `.yml` file.
///
/// # Errors
///
/// Returns `DomainError::Configuration` if the file cannot be read, has an
/// unsupported extension, or does not parse.
pub fn load_catalog(path: &Path) -> Result<EffectCatalog, DomainError> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        DomainError::Configuration(format!("cannot read catalog {}: {e}", path.display()))
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => EffectCatalog::from_json_str(&source),
        Some("yaml" | "yml") => EffectCatalog::from_yaml_str(&source),
        _ => Err(DomainError::Configuration(format!(
            "unsupported catalog format: {}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashflow_effects::domain::descriptors::EffectKind;
    use uuid::Uuid;

    fn scratch_file(extension: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("cashflow-{}.{extension}", Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_catalog_covers_every_effect_kind() {
        let catalog = default_catalog().unwrap();

        for kind in [
            EffectKind::ReduceCashFlow,
            EffectKind::IncreaseCashFlow,
            EffectKind::ChoiceSellOrKeep,
            EffectKind::RemoveBusiness,
            EffectKind::RemoveRealEstate,
            EffectKind::OneTimeCash,
            EffectKind::IncreaseRentalIncome,
        ] {
            assert!(
                catalog.iter().any(|card| card.effect_kind == kind),
                "missing {kind:?}"
            );
        }
    }

    #[test]
    fn test_default_classification_overrides_board_businesses() {
        // Arrange
        let catalog = default_catalog().unwrap();

        // Act
        let table = catalog.classification();

        // Assert
        assert!(table.is_residential("RealEstate05"));
        assert!(!table.is_residential("RealEstate12"));
        assert!(!table.is_residential("Laundromat"));
    }

    #[test]
    fn test_json_file_loads() {
        // Arrange
        let path = scratch_file(
            "json",
            r#"{"cards": [
                {"id": "refund", "effect_kind": "OneTimeCash", "one_time_cash_amount": 10}
            ]}"#,
        );

        // Act
        let catalog = load_catalog(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        // Assert
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("refund").is_some());
    }

    #[test]
    fn test_unknown_extension_is_a_configuration_error() {
        // Arrange
        let path = scratch_file("toml", "cards = []");

        // Act
        let result = load_catalog(&path);
        std::fs::remove_file(&path).unwrap();

        // Assert
        assert!(matches!(result, Err(DomainError::Configuration(_))));
    }

    #[test]
    fn test_missing_file_is_a_configuration_error() {
        // Act
        let result = load_catalog(Path::new("/nonexistent/cards.yaml"));

        // Assert
        assert!(matches!(result, Err(DomainError::Configuration(_))));
    }
}
