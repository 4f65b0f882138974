//! Static game data: encounter pools and the progression track.
//!
//! Contains the monster pools for each stage tier and the stage, armor and
//! weapon lists. Weights are declared data only; nothing samples from them.

use serde::Serialize;
use thiserror::Error;

/// Problems found when validating static tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    #[error("Encounter table '{table}' is empty")]
    EmptyTable { table: String },

    #[error("Encounter table '{table}' has a blank monster name")]
    BlankName { table: String },

    #[error("Monster '{monster}' in table '{table}' has a non-positive weight")]
    NonPositiveWeight { table: String, monster: String },

    #[error("{list} list contains a blank name")]
    BlankTrackEntry { list: &'static str },

    #[error("{list} list contains '{name}' more than once")]
    DuplicateTrackEntry { list: &'static str, name: String },
}

// ============================================================================
// Encounter tables
// ============================================================================

/// A single monster entry with its declared weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncounterEntry {
    pub name: String,
    pub weight: u32,
}

/// An ordered list of (monster, weight) pairs for one stage tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncounterTable {
    pub name: String,
    pub entries: Vec<EncounterEntry>,
}

impl EncounterTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Append a monster, preserving declaration order.
    pub fn with_entry(mut self, name: impl Into<String>, weight: u32) -> Self {
        self.entries.push(EncounterEntry {
            name: name.into(),
            weight,
        });
        self
    }

    pub fn entries(&self) -> &[EncounterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Monster names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Plain sum of the declared weights. Not a probability mass.
    pub fn total_weight(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.weight)).sum()
    }

    /// Check that the table is non-empty and every entry has a name and a positive weight.
    pub fn validate(&self) -> Result<(), CatalogueError> {
        if self.entries.is_empty() {
            return Err(CatalogueError::EmptyTable {
                table: self.name.clone(),
            });
        }
        for entry in &self.entries {
            if entry.name.trim().is_empty() {
                return Err(CatalogueError::BlankName {
                    table: self.name.clone(),
                });
            }
            if entry.weight == 0 {
                return Err(CatalogueError::NonPositiveWeight {
                    table: self.name.clone(),
                    monster: entry.name.clone(),
                });
            }
        }
        Ok(())
    }
}

lazy_static::lazy_static! {
    /// Monster pools, one per stage tier, in tier order.
    pub static ref ENCOUNTER_TABLES: Vec<EncounterTable> = vec![
        EncounterTable::new("Forest")
            .with_entry("Bear", 25)
            .with_entry("Deer", 22)
            .with_entry("Villager", 19),
        EncounterTable::new("Pool 2")
            .with_entry("Knight", 30)
            .with_entry("Snake", 8),
        EncounterTable::new("Pool 3")
            .with_entry("Mystic Spirit", 14)
            .with_entry("Enchanted Wolf", 28)
            .with_entry("Forest Guardian", 45)
            .with_entry("Slime", 6),
        EncounterTable::new("Pool 4")
            .with_entry("Fire Salamander", 30)
            .with_entry("Drake Hatchling", 45)
            .with_entry("Volcanic Guardian", 90),
        EncounterTable::new("Pool 5")
            .with_entry("Tide Wraith", 45)
            .with_entry("Corrupted Crusader", 60)
            .with_entry("DEATH", 200),
    ];
}

/// All encounter tables in tier order.
pub fn encounter_tables() -> &'static [EncounterTable] {
    &ENCOUNTER_TABLES
}

/// Encounter table for a 1-based stage tier.
pub fn encounter_table(tier: usize) -> Option<&'static EncounterTable> {
    tier.checked_sub(1).and_then(|i| ENCOUNTER_TABLES.get(i))
}

// ============================================================================
// Progression track
// ============================================================================

pub const STAGES: [&str; 5] = [
    "Heart of Forest",
    "Forest OutSkirts",
    "Mystical Land",
    "Dragons Peak",
    "Crytal beach",
];

pub const ARMOR: [&str; 4] = ["Defualt", "Base Armor", "Re-Inforced Armor", "Dragons Armor"];

pub const WEAPONS: [&str; 5] = [
    "Default Blace",
    "Blade",
    "Long Sword",
    "Cursed Sword",
    "Fiery Mace",
];

/// Stage names and the parallel equipment tiers.
///
/// The three lists are indexed by an implicit tier but are never
/// cross-referenced with each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressionTrack {
    stages: Vec<String>,
    armor: Vec<String>,
    weapons: Vec<String>,
}

impl ProgressionTrack {
    pub fn new(stages: Vec<String>, armor: Vec<String>, weapons: Vec<String>) -> Self {
        Self {
            stages,
            armor,
            weapons,
        }
    }

    /// The built-in track.
    pub fn standard() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self::new(owned(&STAGES), owned(&ARMOR), owned(&WEAPONS))
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn armor(&self) -> &[String] {
        &self.armor
    }

    pub fn weapons(&self) -> &[String] {
        &self.weapons
    }

    /// Reject blank names and duplicates within any one list.
    pub fn validate(&self) -> Result<(), CatalogueError> {
        for (list, names) in [
            ("Stage", &self.stages),
            ("Armor", &self.armor),
            ("Weapon", &self.weapons),
        ] {
            for (i, name) in names.iter().enumerate() {
                if name.trim().is_empty() {
                    return Err(CatalogueError::BlankTrackEntry { list });
                }
                if names[..i].contains(name) {
                    return Err(CatalogueError::DuplicateTrackEntry {
                        list,
                        name: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for ProgressionTrack {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_tables_in_order() {
        let names: Vec<_> = encounter_tables().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Forest", "Pool 2", "Pool 3", "Pool 4", "Pool 5"]);
    }

    #[test]
    fn test_all_weights_positive() {
        for table in encounter_tables() {
            assert!(!table.is_empty(), "{} is empty", table.name);
            for entry in table.entries() {
                assert!(entry.weight > 0, "{} in {}", entry.name, table.name);
            }
            assert_eq!(table.validate(), Ok(()));
        }
    }

    #[test]
    fn test_forest_pool_contents() {
        let forest = encounter_table(1).unwrap();
        let pairs: Vec<_> = forest
            .entries()
            .iter()
            .map(|e| (e.name.as_str(), e.weight))
            .collect();
        assert_eq!(pairs, [("Bear", 25), ("Deer", 22), ("Villager", 19)]);
    }

    #[test]
    fn test_last_pool_contents() {
        let last = encounter_table(5).unwrap();
        assert_eq!(
            last.names().collect::<Vec<_>>(),
            ["Tide Wraith", "Corrupted Crusader", "DEATH"]
        );
        assert_eq!(last.total_weight(), 305);
    }

    #[test]
    fn test_every_pool_pair_by_pair() {
        let expected: [&[(&str, u32)]; 5] = [
            &[("Bear", 25), ("Deer", 22), ("Villager", 19)],
            &[("Knight", 30), ("Snake", 8)],
            &[
                ("Mystic Spirit", 14),
                ("Enchanted Wolf", 28),
                ("Forest Guardian", 45),
                ("Slime", 6),
            ],
            &[
                ("Fire Salamander", 30),
                ("Drake Hatchling", 45),
                ("Volcanic Guardian", 90),
            ],
            &[("Tide Wraith", 45), ("Corrupted Crusader", 60), ("DEATH", 200)],
        ];

        assert_eq!(encounter_tables().len(), expected.len());
        for (tier, pairs) in expected.iter().enumerate() {
            let table = encounter_table(tier + 1).unwrap();
            let actual: Vec<_> = table
                .entries()
                .iter()
                .map(|e| (e.name.as_str(), e.weight))
                .collect();
            assert_eq!(actual, *pairs, "tier {} ({})", tier + 1, table.name);
        }
    }

    #[test]
    fn test_pool_sizes() {
        let sizes: Vec<_> = encounter_tables().iter().map(EncounterTable::len).collect();
        assert_eq!(sizes, [3, 2, 4, 3, 3]);
    }

    #[test]
    fn test_encounter_table_out_of_range() {
        assert!(encounter_table(0).is_none());
        assert!(encounter_table(6).is_none());
    }

    #[test]
    fn test_validate_rejects_zero_weight() {
        let table = EncounterTable::new("Broken").with_entry("Ghost", 0);
        assert_eq!(
            table.validate(),
            Err(CatalogueError::NonPositiveWeight {
                table: "Broken".to_string(),
                monster: "Ghost".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_rejects_empty_and_blank() {
        assert!(matches!(
            EncounterTable::new("Nothing").validate(),
            Err(CatalogueError::EmptyTable { .. })
        ));
        assert!(matches!(
            EncounterTable::new("Blank").with_entry("  ", 3).validate(),
            Err(CatalogueError::BlankName { .. })
        ));
    }

    #[test]
    fn test_track_literals() {
        let track = ProgressionTrack::standard();
        assert_eq!(
            track.stages(),
            [
                "Heart of Forest",
                "Forest OutSkirts",
                "Mystical Land",
                "Dragons Peak",
                "Crytal beach",
            ]
        );
        assert_eq!(
            track.armor(),
            ["Defualt", "Base Armor", "Re-Inforced Armor", "Dragons Armor"]
        );
        assert_eq!(
            track.weapons(),
            [
                "Default Blace",
                "Blade",
                "Long Sword",
                "Cursed Sword",
                "Fiery Mace",
            ]
        );
        assert_eq!(track.validate(), Ok(()));
    }

    #[test]
    fn test_track_rejects_duplicates() {
        let track = ProgressionTrack::new(
            vec!["A".to_string()],
            vec!["Plate".to_string(), "Plate".to_string()],
            vec![],
        );
        assert_eq!(
            track.validate(),
            Err(CatalogueError::DuplicateTrackEntry {
                list: "Armor",
                name: "Plate".to_string(),
            })
        );
    }
}
