use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use form_spec::{DraftError, DraftRecord, DraftStore, ensure_valid_key};

/// Draft store keeping one pretty-printed JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    root: PathBuf,
}

impl FileDraftStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, DraftError> {
        ensure_valid_key(key)?;
        Ok(self.root.join(format!("{key}.draft.json")))
    }
}

impl DraftStore for FileDraftStore {
    fn load(&self, key: &str) -> Result<Option<DraftRecord>, DraftError> {
        let path = self.path_for(key)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_str(&contents) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable draft");
                Ok(None)
            }
        }
    }

    fn save(&mut self, key: &str, record: &DraftRecord) -> Result<(), DraftError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;
        let contents = record.to_json_pretty().map_err(DraftError::Encode)?;
        fs::write(&path, contents)?;
        tracing::debug!(path = %path.display(), "draft saved");
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<bool, DraftError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
