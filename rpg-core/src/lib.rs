//! Text RPG core: static game data and the LLM session bootstrapper.
//!
//! This crate provides:
//! - Stage, armor and weapon tiers plus per-stage monster pools
//! - The player's starting lives and (empty) inventory
//! - A single-shot chat completion session against an OpenAI-compatible API
//!
//! # Quick Start
//!
//! ```ignore
//! use rpg_core::{Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::new(SessionConfig::from_env());
//!     println!("{}", session.run().await?);
//!     Ok(())
//! }
//! ```

pub mod catalogue;
pub mod player;
pub mod session;
pub mod tables;
pub mod testing;

// Primary public API
pub use catalogue::Catalogue;
pub use player::{Inventory, PlayerState, STARTING_LIVES};
pub use session::{CompletionService, Session, SessionConfig, SessionError, DEFAULT_PROMPT};
pub use tables::{
    encounter_table, encounter_tables, CatalogueError, EncounterEntry, EncounterTable,
    ProgressionTrack, ARMOR, STAGES, WEAPONS,
};
pub use testing::MockCompletion;
#[cfg(any(test, feature = "testing"))]
pub use testing::{MockCompletionServer, MockReply, RecordedRequest};
