//! File-backed key-value storage.
//!
//! Each key is one `<key>.json` file under the data directory. Writes go to
//! a sibling temp file that is flushed to disk and then renamed over the
//! target, so neither readers nor a crash leave a half-written snapshot.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fieldcheck_engine::{Error, KeyValueStorage};

/// Key-value storage over a directory of JSON files.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open storage rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "file storage opened");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn write_atomic(&self, tmp: &Path, path: &Path, value: &str) -> io::Result<()> {
        let mut file = File::create(tmp)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(tmp, path)?;

        // Persist the rename itself
        #[cfg(unix)]
        File::open(&self.dir)?.sync_all()?;

        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> fieldcheck_engine::Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                Err(Error::CorruptState(format!("{}: {}", path.display(), e)))
            }
            Err(e) => Err(Error::Storage(format!("{}: {}", path.display(), e))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> fieldcheck_engine::Result<()> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));

        self.write_atomic(&tmp, &path, value)
            .map_err(|e| Error::Storage(format!("{}: {}", path.display(), e)))?;

        tracing::trace!(path = %path.display(), bytes = value.len(), "snapshot written");
        Ok(())
    }
}
