use std::{
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

/// Watches a presentation file for modifications.
///
/// This polls the file's modification time rather than relying on filesystem notifications.
pub struct PresentationFileWatcher {
    path: PathBuf,
    last_modification: SystemTime,
}

impl PresentationFileWatcher {
    /// Create a watcher over the given file path.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let last_modification = Self::modified_time(&path).ok().flatten().unwrap_or(SystemTime::UNIX_EPOCH);
        Self { path, last_modification }
    }

    /// Check whether the file was modified since the last time this was called.
    ///
    /// A missing file is not considered a modification: editors often replace files by removing
    /// them first.
    pub fn has_modifications(&mut self) -> io::Result<bool> {
        let Some(modified_time) = Self::modified_time(&self.path)? else {
            return Ok(false);
        };
        if modified_time > self.last_modification {
            self.last_modification = modified_time;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn modified_time(path: &Path) -> io::Result<Option<SystemTime>> {
        match fs::metadata(path) {
            Ok(metadata) => Ok(Some(metadata.modified()?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
