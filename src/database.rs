use crate::error::StoreError;
use log::error;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub trait UserDb {
    type Error;
    fn authenticate(&self, username: &str, password: &str) -> bool;
    fn register(&mut self, username: &str, password: &str) -> Result<Registration, Self::Error>;
}

pub trait WatchedDb {
    type Error;
    /// Returns `true` if `title` was not yet in the user's list.
    fn record_watched(&mut self, username: &str, title: &str) -> Result<bool, Self::Error>;
    fn get_watched(&self, username: &str) -> &[String];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created,
    AlreadyExists,
}

const INDENT: &[u8] = b"    ";

/// A JSON document that is always read and written as a whole.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> JsonFile {
        JsonFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document, or `T::default()` if the file does not exist.
    pub fn load<T: DeserializeOwned + Default>(&self) -> Result<T, StoreError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_slice(&data).map_err(|source| StoreError::MalformedJson {
            path: self.path.clone(),
            source,
        })
    }

    /// Like [`JsonFile::load`], but unreadable or malformed documents are
    /// logged and replaced by an empty one.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self) -> T {
        self.load().unwrap_or_else(|err| {
            error!("{}; starting with an empty store", err);
            T::default()
        })
    }

    /// Pretty-prints `value` with four-space indentation into a sibling
    /// temporary file and renames it over the target.
    pub fn save<T: Serialize>(&self, value: &T) -> Result<(), StoreError> {
        let mut data = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut data, formatter);
        value
            .serialize(&mut serializer)
            .map_err(|source| StoreError::Serialize {
                path: self.path.clone(),
                source,
            })?;
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, &data)
            .and_then(|()| fs::rename(&tmp_path, &self.path))
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("absent.json"));
        let map: BTreeMap<String, String> = file.load().unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn save_uses_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("doc.json"));
        let mut map = BTreeMap::new();
        map.insert("alice".to_owned(), vec!["Up".to_owned()]);
        file.save(&map).unwrap();
        let text = fs::read_to_string(file.path()).unwrap();
        assert_eq!(text, "{\n    \"alice\": [\n        \"Up\"\n    ]\n}");
        assert!(!dir.path().join("doc.json.tmp").exists());
        let reloaded: BTreeMap<String, Vec<String>> = file.load().unwrap();
        assert_eq!(reloaded, map);
    }

    #[test]
    fn unserializable_value() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("doc.json"));
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "non-string key");
        let err = file.save(&map).unwrap_err();
        assert!(matches!(err, StoreError::Serialize { .. }));
        assert!(err.to_string().starts_with("Could not serialize"));
        assert!(!file.path().exists());
    }

    #[test]
    fn malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("doc.json"));
        fs::write(file.path(), "{ not json").unwrap();
        let result: Result<BTreeMap<String, String>, _> = file.load();
        assert!(matches!(result, Err(StoreError::MalformedJson { .. })));
        let map: BTreeMap<String, String> = file.load_or_default();
        assert!(map.is_empty());
    }
}
