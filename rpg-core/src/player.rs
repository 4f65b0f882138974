//! Player state and inventory.
//!
//! Both are start-of-run values. There is no operation that changes them.

use serde::Serialize;

/// Lives a fresh player starts with.
pub const STARTING_LIVES: u32 = 10;

/// Player life counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerState {
    max_lives: u32,
    current_lives: u32,
}

impl PlayerState {
    pub fn new() -> Self {
        Self {
            max_lives: STARTING_LIVES,
            current_lives: STARTING_LIVES,
        }
    }

    pub fn max_lives(&self) -> u32 {
        self.max_lives
    }

    pub fn current_lives(&self) -> u32 {
        self.current_lives
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}

/// The player's carried items. Always empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    items: Vec<String>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}
