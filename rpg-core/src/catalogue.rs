//! Everything the game declares at start-up, bundled in one value.

use crate::player::{Inventory, PlayerState};
use crate::tables::{encounter_tables, CatalogueError, EncounterTable, ProgressionTrack};
use serde::Serialize;

/// Static game data plus the initial player state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalogue {
    pub track: ProgressionTrack,
    pub encounters: Vec<EncounterTable>,
    pub player: PlayerState,
    pub inventory: Inventory,
}

impl Catalogue {
    /// The built-in data set.
    pub fn standard() -> Self {
        Self {
            track: ProgressionTrack::standard(),
            encounters: encounter_tables().to_vec(),
            player: PlayerState::new(),
            inventory: Inventory::new(),
        }
    }

    /// Validate the track and every encounter table.
    pub fn validate(&self) -> Result<(), CatalogueError> {
        self.track.validate()?;
        for table in &self.encounters {
            table.validate()?;
        }
        Ok(())
    }

    /// Pretty JSON rendering.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::standard()
    }
}
