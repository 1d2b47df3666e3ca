//! Journal exclusion list backed by a JSON array file.
//!
//! The file is edited out-of-band (admin endpoint, manual edits), so it is re-read
//! on every query instead of cached. Updates are read-merge-write under a process
//! lock and land through a temp-file + rename so readers never see a partial file.

use crate::config;
use crate::document::RecordId;
use crate::error::{CoreError, Result};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Handle on the exclusion file. Holds no ids itself.
#[derive(Debug)]
pub struct ExclusionList {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ExclusionList {
    /// Exclusion list stored at `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Exclusion list stored as `exclusions.json` inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(config::EXCLUSIONS_FILE))
    }

    /// Location of the exclusion file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current set of excluded ids. A missing or unreadable file yields an empty set.
    pub fn load(&self) -> HashSet<String> {
        match self.read() {
            Ok(ids) => ids,
            Err(CoreError::SourceMissing(_)) => HashSet::new(),
            Err(e) => {
                tracing::warn!(path = ?self.path, "Exclusions load failed: {}", e);
                HashSet::new()
            }
        }
    }

    fn read(&self) -> Result<HashSet<String>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CoreError::SourceMissing(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        let ids: Vec<RecordId> = serde_json::from_slice(&raw)?;
        Ok(ids.into_iter().filter_map(RecordId::into_string).collect())
    }

    /// Add (`excluded = true`) or remove an id, rewriting the whole list.
    ///
    /// A missing file is treated as empty. A file that exists but cannot be
    /// parsed is left untouched and the error is returned.
    pub fn set_excluded(&self, id: &str, excluded: bool) -> Result<bool> {
        let _guard = self.write_lock.lock();

        let mut ids = match self.read() {
            Ok(ids) => ids,
            Err(CoreError::SourceMissing(_)) => HashSet::new(),
            Err(e) => return Err(e),
        };
        let changed = if excluded {
            ids.insert(id.to_string())
        } else {
            ids.remove(id)
        };

        let mut sorted: Vec<&String> = ids.iter().collect();
        sorted.sort();
        let bytes = serde_json::to_vec(&sorted)?;

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, &self.path)?;

        tracing::info!(id, excluded, changed, total = ids.len(), "Exclusion list updated");
        Ok(excluded)
    }
}
