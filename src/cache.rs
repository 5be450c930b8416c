use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::error::ScrapeError;
use crate::record::AssessmentRecord;

/// Durable url -> record map backing resume-after-interrupt.
///
/// The whole map is rewritten to one JSON file after every insertion, so
/// the file on disk always holds every record completed so far. A missing
/// or unreadable file degrades to an empty cache; the run then rebuilds it.
pub struct CacheStore {
    path: PathBuf,
    entries: BTreeMap<String, AssessmentRecord>,
}

impl CacheStore {
    /// Load the snapshot at `path`, or start empty when there is none.
    /// Corrupt or unreadable snapshots are logged and discarded, never fatal.
    pub fn load(path: &Path) -> Self {
        let entries = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("discarding corrupt cache {}: {e}", path.display());
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no cache at {}, starting fresh", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                warn!("discarding unreadable cache {}: {e}", path.display());
                BTreeMap::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn get(&self, url: &str) -> Option<&AssessmentRecord> {
        self.entries.get(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert one record and flush the whole map to disk before returning.
    /// A failed flush is logged and swallowed: the in-memory record survives
    /// the run, it just won't survive an interrupt.
    pub fn put(&mut self, url: &str, record: AssessmentRecord) {
        self.entries.insert(url.to_string(), record);
        if let Err(e) = self.persist() {
            error!("{e}");
        }
    }

    fn persist(&self) -> Result<(), ScrapeError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ScrapeError::CachePersist(format!("{}: {e}", self.path.display()))
                })?;
            }
        }

        let file = File::create(&self.path)
            .map_err(|e| ScrapeError::CachePersist(format!("{}: {e}", self.path.display())))?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer(&mut out, &self.entries)
            .map_err(|e| ScrapeError::CachePersist(format!("{}: {e}", self.path.display())))?;
        out.flush()
            .map_err(|e| ScrapeError::CachePersist(format!("{}: {e}", self.path.display())))
    }
}
