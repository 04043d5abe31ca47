//! Per-save persistence for game modifications
//!
//! Feature modules register their data types with a [`SaveSession`], get a
//! [`PersistentData`] handle back, and read or write its value freely. The
//! session loads every handle when the host activates a save and writes them
//! back when the host saves.

pub mod save;

pub use save::{
    Activation, CodecError, DataMap, DataName, DataSource, FlushReport, JsonDataSource, LoadReport,
    Persistable, PersistentData, SaveDirInfo, SaveError, SaveSession, SessionConfig, SlotFailure,
    ValidationStage,
};
