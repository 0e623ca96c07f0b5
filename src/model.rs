use crate::command::{self, SshCommand};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Appended to the name of a duplicated profile.
pub const COPY_SUFFIX: &str = " (Copy)";

/// Stable identifier of a store entry. Assigned when the entry is loaded or
/// added and never reused within the same store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProfileId(pub(crate) u64);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    DirectConnection,
    PortForward,
    ProxyJump,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 3] = [
        ProfileKind::DirectConnection,
        ProfileKind::PortForward,
        ProfileKind::ProxyJump,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ProfileKind::DirectConnection => "direct_connections.yaml",
            ProfileKind::PortForward => "port_forwards.json",
            ProfileKind::ProxyJump => "proxy_jumps.json",
        }
    }

    /// Top-level key the collection is stored under, if the file is a mapping.
    pub fn collection_key(self) -> Option<&'static str> {
        match self {
            ProfileKind::DirectConnection => None,
            ProfileKind::PortForward => Some("port_forwards"),
            ProfileKind::ProxyJump => Some("proxy_jumps"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProfileKind::DirectConnection => "direct connection",
            ProfileKind::PortForward => "port forward",
            ProfileKind::ProxyJump => "proxy jump",
        }
    }
}

/// A persisted description of how to reach a host over SSH.
pub trait Profile: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send {
    const KIND: ProfileKind;

    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
    fn key(&self) -> &str;
    fn command(&self) -> SshCommand;

    /// Field values searched by [`Profile::matches`].
    fn haystack(&self) -> Vec<String>;

    /// Case-insensitive substring match against every field.
    fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.haystack()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn duplicated(&self) -> Self {
        let mut copy = self.clone();
        let name = format!("{}{}", copy.name(), COPY_SUFFIX);
        copy.set_name(name);
        copy
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DirectConnection {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub user: String,
    #[serde(deserialize_with = "lenient::text")]
    pub host: String,
    #[serde(deserialize_with = "lenient::port")]
    pub port: u16,
    #[serde(deserialize_with = "lenient::text")]
    pub key: String,
}

impl DirectConnection {
    pub fn target(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

impl Profile for DirectConnection {
    const KIND: ProfileKind = ProfileKind::DirectConnection;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn command(&self) -> SshCommand {
        command::direct_connection(self)
    }

    fn haystack(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.user.clone(),
            self.host.clone(),
            self.port.to_string(),
            self.key.clone(),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PortForward {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub notes: String,
    #[serde(deserialize_with = "lenient::port")]
    pub local_port: u16,
    #[serde(deserialize_with = "lenient::text")]
    pub target_host: String,
    #[serde(deserialize_with = "lenient::port")]
    pub target_port: u16,
    #[serde(deserialize_with = "lenient::text")]
    pub remote_server_user: String,
    #[serde(deserialize_with = "lenient::text")]
    pub remote_server_host: String,
    #[serde(deserialize_with = "lenient::port")]
    pub remote_server_port: u16,
    #[serde(deserialize_with = "lenient::text")]
    pub key: String,
}

impl PortForward {
    /// The `-L` forwarding spec, `local:target_host:target_port`.
    pub fn forward_spec(&self) -> String {
        format!(
            "{}:{}:{}",
            self.local_port, self.target_host, self.target_port
        )
    }

    pub fn remote_server(&self) -> String {
        format!("{}@{}", self.remote_server_user, self.remote_server_host)
    }
}

impl Profile for PortForward {
    const KIND: ProfileKind = ProfileKind::PortForward;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn command(&self) -> SshCommand {
        command::port_forward(self)
    }

    fn haystack(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.notes.clone(),
            self.local_port.to_string(),
            self.target_host.clone(),
            self.target_port.to_string(),
            self.remote_server_user.clone(),
            self.remote_server_host.clone(),
            self.remote_server_port.to_string(),
            self.key.clone(),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProxyJump {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub target_user: String,
    #[serde(deserialize_with = "lenient::text")]
    pub target_host: String,
    #[serde(deserialize_with = "lenient::port")]
    pub target_port: u16,
    #[serde(deserialize_with = "lenient::text")]
    pub jump_user: String,
    #[serde(deserialize_with = "lenient::text")]
    pub jump_host: String,
    #[serde(deserialize_with = "lenient::port")]
    pub jump_port: u16,
    #[serde(deserialize_with = "lenient::text")]
    pub key: String,
    #[serde(deserialize_with = "lenient::text")]
    pub device_type: String,
}

impl ProxyJump {
    pub fn jump(&self) -> String {
        format!("{}@{}:{}", self.jump_user, self.jump_host, self.jump_port)
    }

    pub fn target(&self) -> String {
        format!("{}@{}", self.target_user, self.target_host)
    }
}

impl Profile for ProxyJump {
    const KIND: ProfileKind = ProfileKind::ProxyJump;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn command(&self) -> SshCommand {
        command::proxy_jump(self)
    }

    fn haystack(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.target_user.clone(),
            self.target_host.clone(),
            self.target_port.to_string(),
            self.jump_user.clone(),
            self.jump_host.clone(),
            self.jump_port.to_string(),
            self.key.clone(),
            self.device_type.clone(),
        ]
    }
}

/// Decoders for hand-edited files: `null` becomes the default, numbers and
/// numeric strings are coerced.
mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Int(i64),
        Float(f64),
        Bool(bool),
        Text(String),
    }

    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            None => String::new(),
            Some(Scalar::Text(text)) => text,
            Some(Scalar::Int(value)) => value.to_string(),
            Some(Scalar::Float(value)) => value.to_string(),
            Some(Scalar::Bool(value)) => value.to_string(),
        })
    }

    pub fn port<'de, D>(deserializer: D) -> Result<u16, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Scalar>::deserialize(deserializer)? {
            None => Ok(0),
            Some(Scalar::Int(value)) => u16::try_from(value)
                .map_err(|_| D::Error::custom(format!("port {value} out of range"))),
            Some(Scalar::Float(value)) => {
                if value.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&value) {
                    Ok(value as u16)
                } else {
                    Err(D::Error::custom(format!("invalid port {value}")))
                }
            }
            Some(Scalar::Text(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(0);
                }
                trimmed
                    .parse::<u16>()
                    .map_err(|_| D::Error::custom(format!("invalid port {text:?}")))
            }
            Some(Scalar::Bool(value)) => Err(D::Error::custom(format!("invalid port {value}"))),
        }
    }
}
