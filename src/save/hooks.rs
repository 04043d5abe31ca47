//! Host event handlers
//!
//! The host calls these from its own hook callbacks. They never fail: bad
//! input and save errors are logged, since an extended save problem must not
//! take the game down with it.

use super::manager::SaveSession;

/// True if `save_name` looks like a host save file
pub fn is_valid_save_file(save_name: Option<&str>, suffix: &str) -> bool {
    match save_name {
        Some(name) => !name.trim().is_empty() && name.ends_with(suffix) && name.len() > suffix.len(),
        None => false,
    }
}

impl SaveSession {
    /// The host finished loading the player's save
    pub fn on_save_loaded(&mut self, save_name: Option<&str>) {
        let Some(save_name) = self.checked_save_name(save_name) else {
            return;
        };

        if let Err(err) = self.activate(&save_name) {
            log::error!("Failed to activate extended save for '{}': {}", save_name, err);
        }
    }

    /// The host is writing the player's save
    ///
    /// Skipped while a loading movie is playing; the host saves during
    /// level transitions before the new save is actually in use.
    pub fn on_game_save(&self, save_name: Option<&str>, loading_movie_playing: bool) {
        if loading_movie_playing {
            log::debug!("Ignoring save request during loading movie");
            return;
        }

        if self.checked_save_name(save_name).is_none() {
            return;
        }

        if let Err(err) = self.flush() {
            log::error!("Extended save failed: {}", err);
        }
    }

    fn checked_save_name(&self, save_name: Option<&str>) -> Option<String> {
        let suffix = &self.config().save_suffix;
        if !is_valid_save_file(save_name, suffix) {
            log::warn!(
                "Save file name {:?} is invalid (missing or not ending with '{}'); extended save data will not be used",
                save_name,
                suffix
            );
            return None;
        }
        save_name.map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::saveable::Persistable;
    use serde::{Deserialize, Serialize};
    use std::fs;
    use tempfile::TempDir;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct ScoreData {
        score: i64,
    }

    impl Persistable for ScoreData {}

    fn session() -> (TempDir, SaveSession) {
        let _ = env_logger::builder().is_test(true).try_init();
        let temp_dir = TempDir::new().unwrap();
        let session = SaveSession::with_base_dir(temp_dir.path()).unwrap();
        (temp_dir, session)
    }

    #[test]
    fn test_is_valid_save_file() {
        assert!(is_valid_save_file(Some("Save0001.sav"), ".sav"));
        assert!(!is_valid_save_file(None, ".sav"));
        assert!(!is_valid_save_file(Some(""), ".sav"));
        assert!(!is_valid_save_file(Some(".sav"), ".sav"));
        assert!(!is_valid_save_file(Some("Save0001.txt"), ".sav"));
    }

    #[test]
    fn test_invalid_save_name_ignored() {
        let (_dir, mut session) = session();

        session.on_save_loaded(None);
        session.on_save_loaded(Some("profile.bin"));

        assert_eq!(session.current_save(), None);
    }

    #[test]
    fn test_load_then_save() {
        let (dir, mut session) = session();
        let slot = session.register::<ScoreData>("player_score").unwrap();

        session.on_save_loaded(Some("Save0001.sav"));
        assert_eq!(session.current_save(), Some("Save0001.sav"));

        slot.update(|s| s.score = 10);
        session.on_game_save(Some("Save0001.sav"), false);

        let path = dir.path().join("Save0001").join("player_score.json");
        assert!(fs::read_to_string(path).unwrap().contains("10"));
    }

    #[test]
    fn test_save_skipped_during_loading_movie() {
        let (dir, mut session) = session();
        let slot = session.register::<ScoreData>("player_score").unwrap();

        session.on_save_loaded(Some("Save0001.sav"));
        slot.update(|s| s.score = 10);
        session.on_game_save(Some("Save0001.sav"), true);
        session.on_game_save(None, false);

        assert!(!dir.path().join("Save0001").exists());
    }

    #[test]
    fn test_custom_suffix() {
        let temp_dir = TempDir::new().unwrap();
        let config = crate::save::SessionConfig::new(temp_dir.path()).with_save_suffix(".SaveGame");
        let mut session = SaveSession::new(config).unwrap();

        session.on_save_loaded(Some("slot1.sav"));
        assert_eq!(session.current_save(), None);

        session.on_save_loaded(Some("slot1.SaveGame"));
        assert_eq!(session.current_save(), Some("slot1.SaveGame"));
    }
}
