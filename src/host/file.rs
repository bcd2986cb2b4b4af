//! host::file
//!
//! A host that persists the board as a JSON file.
//!
//! # Storage
//!
//! - `<path>` - The board, pretty-printed JSON
//! - `<path>.lock` - Lock file with an OS-level exclusive lock
//!
//! # Invariants
//!
//! - Every commit holds the lock for its whole read-apply-write cycle
//! - Lock acquisition is non-blocking (a held lock is a `Conflict`)
//! - Writes are atomic (temp file, fsync, rename)
//! - An operation whose card is not where it says is refused, never
//!   applied to a different position
//!
//! # Example
//!
//! ```no_run
//! use weekboard::core::board::Board;
//! use weekboard::host::file::FileHost;
//!
//! let host = FileHost::new("weekboard.json");
//! host.save(&Board::week_of(chrono::Local::now().date_naive())).unwrap();
//! let board = host.load().unwrap();
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use super::traits::{BoardHost, HostError};
use crate::core::board::{Board, BoardError, Column};
use crate::core::ops::{MoveOperation, Operation, ReorderOperation};

/// Errors from board file operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another process holds the board lock.
    #[error("board file is locked by another process")]
    Locked,

    /// I/O error reading or writing the board.
    #[error("board file i/o error at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not a valid board.
    #[error("invalid board file '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    /// The operation does not fit the stored board.
    #[error(transparent)]
    Board(#[from] BoardError),
}

impl From<StoreError> for HostError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Locked => HostError::Conflict(err.to_string()),
            StoreError::Board(BoardError::StalePosition { .. }) => {
                HostError::Conflict(err.to_string())
            }
            StoreError::Board(BoardError::CardNotFound(_))
            | StoreError::Board(BoardError::ColumnNotFound(_)) => {
                HostError::NotFound(err.to_string())
            }
            StoreError::Board(_) => HostError::Rejected(err.to_string()),
            StoreError::Io { .. } | StoreError::Parse { .. } => HostError::Storage(err.to_string()),
        }
    }
}

/// An exclusive lock on a board file, released on drop.
#[derive(Debug)]
pub struct BoardLock {
    path: PathBuf,
    file: Option<File>,
}

impl BoardLock {
    /// Try to lock the board stored at `board_path`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Locked`] if another process holds the lock
    /// - [`StoreError::Io`] if the lock file cannot be opened
    pub fn acquire(board_path: &Path) -> Result<Self, StoreError> {
        let path = lock_path(board_path);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::Io {
                path: path.clone(),
                source: e,
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                file: Some(file),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(StoreError::Locked),
            Err(e) => Err(StoreError::Io { path, source: e }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for BoardLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = FileExt::unlock(&file);
        }
    }
}

fn lock_path(board_path: &Path) -> PathBuf {
    let mut name = board_path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// The board file's shape, with no checks beyond the field types.
#[derive(Deserialize)]
struct StoredColumns {
    columns: Vec<Column>,
}

/// Board persistence backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileHost {
    path: PathBuf,
}

impl FileHost {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the board file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the stored board.
    pub fn load(&self) -> Result<Board, StoreError> {
        self.parse()
    }

    /// Read the stored columns without checking the placement invariant,
    /// so a damaged file can be inspected.
    pub fn load_columns(&self) -> Result<Vec<Column>, StoreError> {
        let stored: StoredColumns = self.parse()?;
        Ok(stored.columns)
    }

    fn parse<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Replace the stored board, under the lock.
    pub fn save(&self, board: &Board) -> Result<(), StoreError> {
        let _lock = BoardLock::acquire(&self.path)?;
        self.write_atomic(board)
    }

    /// Read, transform and write the board under one lock.
    pub fn update<F>(&self, f: F) -> Result<Board, StoreError>
    where
        F: FnOnce(&Board) -> Result<Board, StoreError>,
    {
        let _lock = BoardLock::acquire(&self.path)?;
        let current = self.load()?;
        let next = f(&current)?;
        self.write_atomic(&next)?;
        Ok(next)
    }

    /// Apply an operation to the stored board.
    pub fn apply(&self, op: &Operation) -> Result<Board, StoreError> {
        self.update(|board| Ok(board.apply(op)?))
    }

    fn write_atomic(&self, board: &Board) -> Result<(), StoreError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| StoreError::Io { path, source }
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let contents = serde_json::to_string_pretty(board).map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = File::create(&temp_path).map_err(io_err(&temp_path))?;
        file.write_all(contents.as_bytes())
            .map_err(io_err(&temp_path))?;
        file.sync_all().map_err(io_err(&temp_path))?;
        fs::rename(&temp_path, &self.path).map_err(io_err(&self.path))?;

        Ok(())
    }

    async fn commit_blocking(&self, op: Operation) -> Result<(), HostError> {
        let host = self.clone();
        let result = tokio::task::spawn_blocking(move || host.apply(&op))
            .await
            .map_err(|e| HostError::Storage(format!("commit task failed: {}", e)))?;

        match result {
            Ok(board) => {
                tracing::debug!(
                    path = %self.path.display(),
                    fingerprint = board.fingerprint().short(),
                    "board file updated"
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl BoardHost for FileHost {
    async fn move_card(&self, op: &MoveOperation) -> Result<(), HostError> {
        self.commit_blocking(Operation::Move(op.clone())).await
    }

    async fn reorder_card(&self, op: &ReorderOperation) -> Result<(), HostError> {
        self.commit_blocking(Operation::Reorder(op.clone())).await
    }
}
