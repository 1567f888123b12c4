use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::warn;

use crate::{KeyValueStore, StoreError};

/// Store backed by a single JSON object on disk.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so readers observe either the previous or the next
/// version of every entry.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`.
    ///
    /// A missing file yields an empty store. A file whose contents are not a
    /// JSON object of strings is treated as empty and replaced on the next
    /// write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => parse_entries(&path, &contents),
            Err(error) if error.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        Ok(Self { path, entries })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put_all(&mut self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let mut next = self.entries.clone();
        for (key, value) in entries {
            let _ = next.insert((*key).to_owned(), value.clone());
        }
        write_atomically(&self.path, &next)?;
        self.entries = next;
        Ok(())
    }
}

fn parse_entries(path: &Path, contents: &str) -> BTreeMap<String, String> {
    if contents.trim().is_empty() {
        return BTreeMap::new();
    }

    match serde_json::from_str(contents) {
        Ok(entries) => entries,
        Err(error) => {
            warn!(path = %path.display(), %error, "discarding unreadable progress file");
            BTreeMap::new()
        }
    }
}

fn write_atomically(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_error = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(directory).map_err(write_error)?;
    let mut file = NamedTempFile::new_in(directory).map_err(write_error)?;
    serde_json::to_writer_pretty(&mut file, entries)?;
    file.write_all(b"\n").map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    let _ = file.persist(path).map_err(|source| StoreError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
