use crate::constants::SAVE_VERSION_MAGIC;
use crate::game_state::GameState;
use crate::validation::{validate_loaded, LoadOutcome};
use directories::ProjectDirs;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Why a save could not be read or written.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("save file is corrupt: {0}")]
    Corrupt(&'static str),
    #[error("could not encode game state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Manages saving and loading game state with a checksummed envelope.
///
/// File format:
/// - Version magic (8 bytes)
/// - Payload length (4 bytes)
/// - JSON-encoded game state (variable length)
/// - SHA256 checksum (32 bytes)
pub struct SaveManager {
    save_path: PathBuf,
}

impl SaveManager {
    /// Creates a new SaveManager instance.
    ///
    /// Sets up the save directory at the appropriate location for the
    /// platform using the `directories` crate.
    pub fn new() -> Result<Self, SaveError> {
        let project_dirs = ProjectDirs::from("", "", "forgemaster").ok_or_else(|| {
            SaveError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;

        let config_dir = project_dirs.config_dir();
        fs::create_dir_all(config_dir)?;

        Ok(Self {
            save_path: config_dir.join("save.dat"),
        })
    }

    /// Creates a SaveManager over an explicit file path, for embedders that
    /// manage their own storage location (and for tests).
    pub fn with_path(save_path: PathBuf) -> Self {
        Self { save_path }
    }

    /// Creates a SaveManager for testing with a unique temporary directory.
    #[cfg(test)]
    pub(crate) fn new_for_test() -> Result<Self, SaveError> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

        let test_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir().join(format!("forgemaster-test-{}", test_id));
        fs::create_dir_all(&temp_dir)?;

        Ok(Self::with_path(temp_dir.join("save.dat")))
    }

    /// Serializes the game state and writes it with checksum protection.
    pub fn save(&self, state: &GameState) -> Result<(), SaveError> {
        let data = serde_json::to_vec(state)?;
        let data_len = data.len() as u32;

        // Checksum covers version + length + payload
        let mut hasher = Sha256::new();
        hasher.update(SAVE_VERSION_MAGIC.to_le_bytes());
        hasher.update(data_len.to_le_bytes());
        hasher.update(&data);
        let checksum = hasher.finalize();

        let mut file = fs::File::create(&self.save_path)?;
        file.write_all(&SAVE_VERSION_MAGIC.to_le_bytes())?;
        file.write_all(&data_len.to_le_bytes())?;
        file.write_all(&data)?;
        file.write_all(&checksum)?;

        Ok(())
    }

    /// Loads the game state, validating every field and reconciling timed
    /// work (research, forge upgrades) that finished while the process was
    /// down.
    ///
    /// Returns an error if the file is missing, the magic or checksum does
    /// not match, or the payload is not JSON. Field-level problems do not
    /// fail the load; they are dropped and reported in the outcome.
    pub fn load(&self, now: i64) -> Result<LoadOutcome, SaveError> {
        let mut file = fs::File::open(&self.save_path)?;

        let mut version_bytes = [0u8; 8];
        file.read_exact(&mut version_bytes)?;
        let version = u64::from_le_bytes(version_bytes);
        if version != SAVE_VERSION_MAGIC {
            return Err(SaveError::Corrupt("bad version magic"));
        }

        let mut length_bytes = [0u8; 4];
        file.read_exact(&mut length_bytes)?;
        let data_len = u32::from_le_bytes(length_bytes);

        let mut data = vec![0u8; data_len as usize];
        file.read_exact(&mut data)?;

        let mut stored_checksum = [0u8; 32];
        file.read_exact(&mut stored_checksum)?;

        let mut hasher = Sha256::new();
        hasher.update(version_bytes);
        hasher.update(length_bytes);
        hasher.update(&data);
        let computed_checksum = hasher.finalize();
        if stored_checksum != computed_checksum.as_slice() {
            return Err(SaveError::Corrupt("checksum mismatch"));
        }

        let value: serde_json::Value =
            serde_json::from_slice(&data).map_err(|_| SaveError::Corrupt("payload is not JSON"))?;

        let mut outcome = validate_loaded(&value);
        outcome.state.reconcile(now);
        Ok(outcome)
    }

    /// `load` against the current wall clock.
    pub fn load_now(&self) -> Result<LoadOutcome, SaveError> {
        self.load(chrono::Utc::now().timestamp())
    }

    /// Loads the save if one exists and is readable, otherwise returns a
    /// fresh game. Never fails: corruption is logged and discarded.
    pub fn load_or_default(&self, now: i64) -> GameState {
        match self.load(now) {
            Ok(outcome) => outcome.state,
            Err(SaveError::Io(e)) if e.kind() == io::ErrorKind::NotFound => GameState::new(),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable save");
                GameState::new()
            }
        }
    }

    /// Checks if a save file exists.
    pub fn save_exists(&self) -> bool {
        self.save_path.exists()
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &PathBuf {
        &self.save_path
    }
}
