use crate::error::{Result, StoreError};
use crate::model::ProfileKind;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }
}

/// Shape of the top-level document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// The file is a list of profiles.
    Sequence,
    /// The file is a mapping holding the list under this key.
    Keyed(String),
}

/// What to do when the file exists but cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Warn, keep a `.corrupt` copy of the file and start empty.
    Degrade,
    /// Return [`StoreError::MalformedData`].
    Fail,
}

/// Structured-file persistence for one profile collection.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    format: Format,
    layout: Layout,
    on_malformed: MalformedPolicy,
}

impl FileBackend {
    pub fn new(path: PathBuf, format: Format, layout: Layout, on_malformed: MalformedPolicy) -> Self {
        Self {
            path,
            format,
            layout,
            on_malformed,
        }
    }

    /// Backend with the historical format, layout and policy for `kind`:
    /// YAML sequences fail on malformed data, keyed JSON degrades.
    pub fn for_kind(kind: ProfileKind, path: PathBuf) -> Self {
        let layout = match kind.collection_key() {
            Some(key) => Layout::Keyed(key.to_string()),
            None => Layout::Sequence,
        };
        let (format, on_malformed) = match kind {
            ProfileKind::DirectConnection => (Format::Yaml, MalformedPolicy::Fail),
            ProfileKind::PortForward | ProfileKind::ProxyJump => {
                (Format::Json, MalformedPolicy::Degrade)
            }
        };
        Self::new(path, format, layout, on_malformed)
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_policy(mut self, on_malformed: MalformedPolicy) -> Self {
        self.on_malformed = on_malformed;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn policy(&self) -> MalformedPolicy {
        self.on_malformed
    }

    pub fn load<P: DeserializeOwned>(&self) -> Result<Vec<P>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no profile file at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(err) => return Err(StoreError::io(&self.path, err)),
        };
        let data = match String::from_utf8(bytes) {
            Ok(data) => data,
            Err(err) => return self.handle_malformed(err.to_string()),
        };
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }

        match self.decode(&data) {
            Ok(items) => {
                debug!("loaded {} profiles from {}", items.len(), self.path.display());
                Ok(items)
            }
            Err(message) => self.handle_malformed(message),
        }
    }

    /// Replaces the file with `items`. The new content is written to a
    /// sibling temp file and renamed over the target.
    pub fn save<P: Serialize>(&self, items: &[P]) -> Result<()> {
        let data = match &self.layout {
            Layout::Sequence => self.encode(&items)?,
            Layout::Keyed(key) => self.encode(&Keyed { key, items })?,
        };
        atomic_write(&self.path, data.as_bytes())?;
        debug!("saved {} profiles to {}", items.len(), self.path.display());
        Ok(())
    }

    fn decode<P: DeserializeOwned>(&self, data: &str) -> std::result::Result<Vec<P>, String> {
        let document: Value = match self.format {
            Format::Json => serde_json::from_str(data).map_err(|err| err.to_string())?,
            Format::Yaml => serde_yaml::from_str(data).map_err(|err| err.to_string())?,
        };

        let list = match (&self.layout, document) {
            (Layout::Sequence, document) => document,
            (Layout::Keyed(key), Value::Object(mut map)) => map.remove(key).unwrap_or(Value::Null),
            (Layout::Keyed(key), other) => {
                return Err(format!(
                    "expected a mapping with a {key:?} entry, found {}",
                    describe(&other)
                ));
            }
        };

        match list {
            Value::Null => Ok(Vec::new()),
            list @ Value::Array(_) => serde_json::from_value(list).map_err(|err| err.to_string()),
            other => Err(format!("expected a list of profiles, found {}", describe(&other))),
        }
    }

    fn encode<T: Serialize + ?Sized>(&self, document: &T) -> Result<String> {
        let serialize_err = |message: String| StoreError::Serialize { message };
        match self.format {
            Format::Json => {
                let mut buf = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
                document
                    .serialize(&mut serializer)
                    .map_err(|err| serialize_err(err.to_string()))?;
                String::from_utf8(buf).map_err(|err| serialize_err(err.to_string()))
            }
            Format::Yaml => serde_yaml::to_string(document).map_err(|err| serialize_err(err.to_string())),
        }
    }

    fn handle_malformed<P>(&self, message: String) -> Result<Vec<P>> {
        match self.on_malformed {
            MalformedPolicy::Fail => Err(StoreError::malformed(&self.path, message)),
            MalformedPolicy::Degrade => {
                warn!(
                    "ignoring malformed profile file {}: {}",
                    self.path.display(),
                    message
                );
                let backup = self.corrupt_path();
                match fs::copy(&self.path, &backup) {
                    Ok(_) => warn!("kept unreadable content at {}", backup.display()),
                    Err(err) => warn!("unable to back up {}: {}", self.path.display(), err),
                }
                Ok(Vec::new())
            }
        }
    }

    pub fn corrupt_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".corrupt");
        self.path.with_file_name(name)
    }
}

struct Keyed<'a, P> {
    key: &'a str,
    items: &'a [P],
}

impl<P: Serialize> Serialize for Keyed<'_, P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, self.items)?;
        map.end()
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;

    // NamedTempFile is created with mode 0600 on unix.
    let mut temp = NamedTempFile::new_in(parent).map_err(|err| StoreError::io(parent, err))?;
    temp.write_all(data)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|err| StoreError::io(temp.path(), err))?;
    temp.persist(path)
        .map_err(|err| StoreError::io(path, err.error))?;
    // Best effort: the new content is already in place.
    if let Err(err) = sync_dir(parent) {
        warn!("unable to flush directory {}: {}", parent.display(), err);
    }
    Ok(())
}

/// Flushes the directory entry so the rename survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
