//! Who owns which board asset.
//!
//! This is the simulation's asset world: when the effect engine removes an
//! asset from a player, the deed is torn up and the space is for sale again.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use cashflow_effects::domain::collaborators::AssetWorld;
use cashflow_effects::domain::player::OwnedAsset;
use tracing::info;
use uuid::Uuid;

/// Ownership registry for board assets.
#[derive(Debug, Default)]
pub struct Deeds {
    owners: Mutex<HashMap<String, Uuid>>,
    destroyed: Mutex<Vec<String>>,
}

impl Deeds {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `owner` for `name`. Returns `false` if someone already owns it.
    pub fn claim(&self, name: &str, owner: Uuid) -> bool {
        let mut owners = self.owners.lock().unwrap_or_else(PoisonError::into_inner);
        if owners.contains_key(name) {
            return false;
        }
        owners.insert(name.to_owned(), owner);
        true
    }

    /// The current owner of `name`.
    #[must_use]
    pub fn owner_of(&self, name: &str) -> Option<Uuid> {
        self.owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }

    /// Names destroyed so far, in order.
    #[must_use]
    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AssetWorld for Deeds {
    fn destroy(&self, asset: &OwnedAsset) {
        let previous = self
            .owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&asset.name);
        self.destroyed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(asset.name.clone());
        info!(asset = %asset.name, owner = ?previous, "asset destroyed, space back on sale");
    }
}
