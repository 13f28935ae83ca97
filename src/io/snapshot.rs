use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{error, info};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::io::lock::{LockError, SnapshotLock};
use crate::model::node::Node;
use crate::ops::locate::Preorder;
use crate::store::TreeStore;

pub const SNAPSHOT_FILE: &str = "tasks.json";

/// Plain record form of a store: the nested task forest plus the selection.
///
/// This is what gets written to disk and what an external persistence layer
/// may hold verbatim. Converting to and from a [`TreeStore`] keeps every id
/// and the exact ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Node>,
    #[serde(default)]
    pub active_task_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse snapshot: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("snapshot contains duplicate task id {0}")]
    DuplicateId(String),
    #[error(transparent)]
    Lock(#[from] LockError),
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse either a `{ tasks, activeTaskId }` object or a bare task array
    /// (older exports carry no selection). Missing node fields are filled with
    /// defaults; duplicate ids are rejected.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let snapshot = if text.trim_start().starts_with('[') {
            Snapshot {
                tasks: serde_json::from_str(text)?,
                active_task_id: None,
            }
        } else {
            serde_json::from_str::<Snapshot>(text)?
        };
        snapshot.check_unique_ids()?;
        Ok(snapshot)
    }

    /// Every id in the forest, at any depth, must be distinct.
    pub fn check_unique_ids(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::new();
        for loc in Preorder::new(&self.tasks) {
            if !seen.insert(loc.node.id.as_str()) {
                return Err(SnapshotError::DuplicateId(loc.node.id.clone()));
            }
        }
        Ok(())
    }

    pub fn into_store(self) -> Result<TreeStore, SnapshotError> {
        let mut store = TreeStore::new();
        store.restore(self)?;
        Ok(store)
    }
}

impl TreeStore {
    /// Export the forest and selection as a plain record.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.forest().to_vec(),
            active_task_id: self.active_id().map(str::to_string),
        }
    }

    /// Replace the store's contents with `snapshot`. A selection naming a task
    /// that is not in the snapshot is dropped. On a duplicate id the store is
    /// left as it was.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<(), SnapshotError> {
        snapshot.check_unique_ids()?;
        self.replace(snapshot.tasks, snapshot.active_task_id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

pub fn snapshot_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SNAPSHOT_FILE)
}

/// Read `tasks.json` from `data_dir`. `Ok(None)` when there is no file yet.
pub fn load_snapshot(data_dir: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    let path = snapshot_path(data_dir);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(SnapshotError::ReadError { path, source: e }),
    };
    let snapshot = Snapshot::from_json(&text)?;
    info!(
        "event=snapshot_load module=io status=ok tasks={} path={}",
        snapshot.tasks.len(),
        path.display()
    );
    Ok(Some(snapshot))
}

/// Write `tasks.json` atomically under the data directory lock.
pub fn save_snapshot(data_dir: &Path, snapshot: &Snapshot) -> Result<(), SnapshotError> {
    let path = snapshot_path(data_dir);
    let content = snapshot.to_json()?;
    let _lock = SnapshotLock::acquire_default(data_dir)?;
    if let Err(e) = atomic_write(&path, content.as_bytes()) {
        error!(
            "event=snapshot_save module=io status=error path={} error={}",
            path.display(),
            e
        );
        return Err(SnapshotError::WriteError { path, source: e });
    }
    info!(
        "event=snapshot_save module=io status=ok tasks={} path={}",
        snapshot.tasks.len(),
        path.display()
    );
    Ok(())
}

/// Write through a temp file in the same directory, then rename over `path`.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
