use crate::model::ProfileKind;
use crate::store::{FileBackend, Format, MalformedPolicy, resolve_data_dir};
use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Contents of the optional `config.json`. Every field has a default, so an
/// empty object is a valid config.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: Option<PathBuf>,
    pub direct_connections: FileConfig,
    pub port_forwards: FileConfig,
    pub proxy_jumps: FileConfig,
    /// Terminal emulator command line used by `connect`, e.g. `"xterm -e"`.
    pub terminal: Option<String>,
    pub theme: ThemeConfig,
}

/// Per-kind overrides of the backing file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    /// Absolute, or relative to the data directory.
    pub path: Option<PathBuf>,
    pub format: Option<Format>,
    pub on_malformed: Option<MalformedPolicy>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ThemeConfig {
    pub enabled: bool,
    pub header: String,
    pub index: String,
    pub name: String,
    pub target: String,
    pub port: String,
    pub key: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            header: "Yellow".to_string(),
            index: "DarkGray".to_string(),
            name: "Cyan".to_string(),
            target: "Green".to_string(),
            port: "Magenta".to_string(),
            key: "Blue".to_string(),
        }
    }
}

impl AppConfig {
    pub fn file(&self, kind: ProfileKind) -> &FileConfig {
        match kind {
            ProfileKind::DirectConnection => &self.direct_connections,
            ProfileKind::PortForward => &self.port_forwards,
            ProfileKind::ProxyJump => &self.proxy_jumps,
        }
    }

    /// Data directory: command-line override, then the config file, then
    /// the platform default.
    pub fn data_dir(&self, cli_override: Option<PathBuf>) -> Result<PathBuf> {
        resolve_data_dir(cli_override.or_else(|| self.data_dir.clone()))
    }

    pub fn backend(&self, kind: ProfileKind, data_dir: &Path) -> FileBackend {
        let file = self.file(kind);
        let path = match &file.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => data_dir.join(path),
            None => data_dir.join(kind.file_name()),
        };
        let format = file.format.or_else(|| {
            file.path
                .as_deref()
                .and_then(Format::from_path)
        });

        let mut backend = FileBackend::for_kind(kind, path);
        if let Some(format) = format {
            backend = backend.with_format(format);
        }
        if let Some(policy) = file.on_malformed {
            backend = backend.with_policy(policy);
        }
        backend
    }
}

pub fn load_config(override_path: Option<PathBuf>) -> Result<AppConfig> {
    let Some(path) = resolve_config_path(override_path)? else {
        return Ok(AppConfig::default());
    };
    let data =
        fs::read_to_string(&path).with_context(|| format!("unable to read {}", path.display()))?;
    let config = serde_json::from_str(&data)
        .with_context(|| format!("unable to parse {}", path.display()))?;
    log::debug!("loaded config from {}", path.display());
    Ok(config)
}

fn resolve_config_path(override_path: Option<PathBuf>) -> Result<Option<PathBuf>> {
    if let Some(path) = override_path {
        return Ok(Some(path));
    }

    let project_dirs = ProjectDirs::from("", "", crate::store::APP_NAME)
        .ok_or_else(|| anyhow!("unable to resolve config directory"))?;
    let candidate = project_dirs.config_dir().join(CONFIG_FILE_NAME);
    if candidate.exists() {
        Ok(Some(candidate))
    } else {
        Ok(None)
    }
}
