//! Journal blob enumeration — the object-storage seam.
//!
//! The decoder only needs two things from storage: a listing of journal
//! blobs under a prefix and a sequential byte reader per blob. That is the
//! [`JournalStore`] trait; [`LocalStore`] implements it over the local
//! filesystem, and a cloud backend would implement the same two methods.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported scheme {scheme:?} in {url:?} (only local paths and file:// are supported)")]
    UnsupportedScheme { scheme: String, url: String },
    #[error("source {path:?} is not a directory")]
    NotADirectory { path: PathBuf },
}

/// One journal blob and the name its output is reported under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JournalRef {
    /// Frozen-bucket name the blob belongs to (the directory above
    /// `rawdata/`), falling back to the blob path.
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Sequential access to journal blobs under a prefix.
pub trait JournalStore {
    /// Enumerates journal blobs, sorted by path.
    fn list(&self) -> StoreResult<Vec<JournalRef>>;

    /// Opens a sequential byte reader over one blob.
    fn open(&self, journal: &JournalRef) -> StoreResult<Box<dyn Read + Send>>;
}

/// Local-filesystem store.
#[derive(Debug)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(source: &str) -> StoreResult<Self> {
        Ok(Self {
            root: local_root(source)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Resolves a source/destination argument to a local path, rejecting URL
/// schemes this build has no client for.
pub fn local_root(url: &str) -> StoreResult<PathBuf> {
    if let Some(path) = url.strip_prefix("file://") {
        return Ok(PathBuf::from(path));
    }
    if let Some((scheme, rest)) = url.split_once("://") {
        // a windows drive letter is not a scheme; everything else is
        if scheme.len() > 1 || rest.is_empty() {
            return Err(StoreError::UnsupportedScheme {
                scheme: scheme.to_string(),
                url: url.to_string(),
            });
        }
    }
    Ok(PathBuf::from(url))
}

impl JournalStore for LocalStore {
    fn list(&self) -> StoreResult<Vec<JournalRef>> {
        if !self.root.is_dir() {
            return Err(StoreError::NotADirectory {
                path: self.root.clone(),
            });
        }
        let mut found = Vec::new();
        walk(&self.root, &mut found)?;
        found.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(found)
    }

    fn open(&self, journal: &JournalRef) -> StoreResult<Box<dyn Read + Send>> {
        let file = File::open(&journal.path).map_err(|source| StoreError::Io {
            path: journal.path.clone(),
            source,
        })?;
        Ok(Box::new(file))
    }
}

fn walk(dir: &Path, found: &mut Vec<JournalRef>) -> StoreResult<()> {
    let entries = fs::read_dir(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        if file_type.is_dir() {
            walk(&path, found)?;
            continue;
        }
        if !file_type.is_file() || !is_journal_blob(&path) {
            continue;
        }
        let size = entry
            .metadata()
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?
            .len();
        debug!(path = %path.display(), size, "found journal blob");
        found.push(JournalRef {
            name: bucket_name(&path),
            path,
            size,
        });
    }
    Ok(())
}

fn is_journal_blob(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == "journal" || name == "journal.zst")
}

/// `<bucket>/rawdata/journal[.zst]` reports as `<bucket>`.
fn bucket_name(path: &Path) -> String {
    let dir = path.parent();
    let under_rawdata = dir
        .and_then(Path::file_name)
        .is_some_and(|name| name == "rawdata");
    if under_rawdata
        && let Some(name) = dir
            .and_then(Path::parent)
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
    {
        return name.to_string();
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn touch(path: &Path, contents: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn lists_journal_blobs_sorted_with_bucket_names() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("frozen/db_b/rawdata/journal.zst"), b"b");
        touch(&root.join("frozen/db_a/rawdata/journal"), b"aa");
        touch(&root.join("frozen/db_a/rawdata/slicesv2.dat"), b"ignored");
        touch(&root.join("frozen/notes.txt"), b"ignored");

        let store = LocalStore::new(root.to_str().unwrap()).unwrap();
        let journals = store.list().unwrap();
        assert_eq!(journals.len(), 2);
        assert_eq!(journals[0].name, "db_a");
        assert_eq!(journals[0].size, 2);
        assert_eq!(journals[1].name, "db_b");
    }

    #[test]
    fn blob_outside_rawdata_reports_its_path() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("loose/journal"), b"x");

        let store = LocalStore::new(root.to_str().unwrap()).unwrap();
        let journals = store.list().unwrap();
        assert_eq!(journals.len(), 1);
        assert!(journals[0].name.ends_with("journal"));
    }

    #[test]
    fn open_streams_blob_bytes() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("db/rawdata/journal"), b"payload");

        let store = LocalStore::new(root.to_str().unwrap()).unwrap();
        let journals = store.list().unwrap();
        let mut reader = store.open(&journals[0]).unwrap();
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"payload");
    }

    #[test]
    fn rejects_url_schemes() {
        let err = LocalStore::new("gs://bucket/frozen").unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedScheme { scheme, .. } if scheme == "gs"));
    }

    #[test]
    fn accepts_file_scheme_and_plain_paths() {
        assert_eq!(
            local_root("file:///tmp/frozen").unwrap(),
            PathBuf::from("/tmp/frozen")
        );
        assert_eq!(local_root("/tmp/frozen").unwrap(), PathBuf::from("/tmp/frozen"));
    }

    #[test]
    fn missing_source_is_an_error() {
        let store = LocalStore::new("/definitely/not/here").unwrap();
        assert!(matches!(
            store.list(),
            Err(StoreError::NotADirectory { .. })
        ));
    }
}
