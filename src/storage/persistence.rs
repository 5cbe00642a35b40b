//! Launchpad persistence layer
//!
//! Saves and loads the complete registry state (listings, token ledgers,
//! native balances and the event log) as JSON.

use crate::launchpad::Launchpad;
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub state_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".launchpad_data"),
            state_file: "launchpad.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Launchpad storage manager
#[derive(Debug)]
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Data directory in use
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the state file path
    fn state_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.state_file)
    }

    /// Get a backup file path
    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.state_file, index))
    }

    /// Save the launchpad to disk
    pub fn save(&self, launchpad: &Launchpad) -> Result<(), StorageError> {
        let path = self.state_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        // Write to temporary file first
        let temp_path = self
            .config
            .data_dir
            .join(format!("{}.tmp", self.config.state_file));
        let file = fs::File::create(&temp_path)?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, launchpad)?;

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        log::debug!("Launchpad state saved to {:?}", path);
        Ok(())
    }

    /// Load the launchpad from disk
    pub fn load(&self) -> Result<Launchpad, StorageError> {
        let path = self.state_path();

        if !path.exists() {
            return Err(StorageError::InvalidData(
                "Launchpad state file not found".to_string(),
            ));
        }

        read_state(&path)
    }

    /// Check if a saved launchpad exists
    pub fn exists(&self) -> bool {
        self.state_path().exists()
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        // Delete oldest backup
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        // Shift existing backups
        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                let next = self.backup_path(i + 1);
                fs::rename(&current, &next)?;
            }
        }

        Ok(())
    }

    /// Restore from a backup
    pub fn restore_backup(&self, backup_index: usize) -> Result<Launchpad, StorageError> {
        let backup_path = self.backup_path(backup_index);

        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }

        read_state(&backup_path)
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|&i| self.backup_path(i).exists())
            .collect()
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats, StorageError> {
        let path = self.state_path();

        let file_size = if path.exists() {
            fs::metadata(&path)?.len()
        } else {
            0
        };

        Ok(StorageStats {
            file_size,
            backup_count: self.list_backups().len(),
            data_dir: self.config.data_dir.clone(),
        })
    }
}

/// Storage statistics
#[derive(Debug)]
pub struct StorageStats {
    pub file_size: u64,
    pub backup_count: usize,
    pub data_dir: PathBuf,
}

/// Save launchpad state to a specific file path
pub fn save_to_file(launchpad: &Launchpad, path: &Path) -> Result<(), StorageError> {
    let file = fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, launchpad)?;
    Ok(())
}

/// Load launchpad state from a specific file path
pub fn load_from_file(path: &Path) -> Result<Launchpad, StorageError> {
    read_state(path)
}

/// Deserialize a state file and refuse it if the books do not balance
fn read_state(path: &Path) -> Result<Launchpad, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let launchpad: Launchpad = serde_json::from_reader(reader)?;

    let violations = launchpad.invariant_violations();
    if !violations.is_empty() {
        return Err(StorageError::InvalidData(violations.join("; ")));
    }

    Ok(launchpad)
}
