//! Extended save data
//!
//! Lets independent feature modules keep their own data alongside the host
//! game's saves without touching the host's save format:
//! - One JSON file per registered type, per host save
//! - Loaded automatically when the host activates a save
//! - Flushed when the host saves, or on demand
//! - Trait-based design; any serde type can opt in
//!
//! # Architecture
//!
//! - `saveable`: Persistable trait for registered types
//! - `codec`: value ↔ map ↔ JSON bytes
//! - `finite`: NaN/infinity check run before encoding
//! - `validate`: registration-time round trip check
//! - `data_source`: per-type file load/save
//! - `slot`: PersistentData handles held by feature modules
//! - `manager`: SaveSession, the registry and active-save state machine
//! - `hooks`: host event handlers
//! - `config`, `types`, `error`: supporting types
//!
//! # Example Usage
//!
//! ```ignore
//! let mut session = SaveSession::new(SessionConfig::default())?;
//! let score = session.register::<ScoreData>("player_score")?;
//!
//! // Host loaded "Save0001.sav"
//! session.on_save_loaded(Some("Save0001.sav"));
//! score.update(|s| s.score += 1);
//!
//! // Host is saving
//! session.on_game_save(Some("Save0001.sav"), false);
//! ```

pub mod codec;
pub mod config;
pub mod data_source;
pub mod error;
pub mod finite;
pub mod hooks;
pub mod manager;
pub mod saveable;
pub mod slot;
pub mod types;
pub mod validate;

// Re-export commonly used types
pub use codec::DataMap;
pub use config::SessionConfig;
pub use data_source::{DataSource, JsonDataSource};
pub use error::{CodecError, Result, SaveError, SlotFailure, ValidationStage};
pub use hooks::is_valid_save_file;
pub use manager::SaveSession;
pub use saveable::Persistable;
pub use slot::PersistentData;
pub use types::*;
pub use validate::validate;
