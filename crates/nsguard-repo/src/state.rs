use camino::{Utf8Path, Utf8PathBuf};
use std::time::SystemTime;

/// What the filesystem says about a backing file right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Probe {
    pub exists: bool,
    pub modified: Option<SystemTime>,
}

impl Probe {
    pub fn of(path: &Utf8Path) -> Self {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => Probe {
                exists: true,
                modified: meta.modified().ok(),
            },
            _ => Probe {
                exists: false,
                modified: None,
            },
        }
    }
}

/// Per-file bookkeeping used to decide whether a reload is necessary.
#[derive(Clone, Debug)]
pub(crate) struct ConfigSourceState {
    path: Utf8PathBuf,
    exists: bool,
    /// Modification time sampled right before the last successful read.
    loaded_modified: Option<SystemTime>,
}

impl ConfigSourceState {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self {
            path,
            exists: false,
            loaded_modified: None,
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// True iff the file appeared or disappeared, or it exists with a strictly newer mtime.
    pub fn has_changed(&self) -> bool {
        let now = Probe::of(&self.path);
        if now.exists != self.exists {
            return true;
        }
        match (now.modified, self.loaded_modified) {
            (Some(current), Some(loaded)) => now.exists && current > loaded,
            _ => false,
        }
    }

    pub fn mark_loaded(&mut self, modified: Option<SystemTime>) {
        self.exists = true;
        self.loaded_modified = modified;
    }

    /// Also used after a failed load so the next refresh retries.
    pub fn mark_missing(&mut self) {
        self.exists = false;
        self.loaded_modified = None;
    }
}
