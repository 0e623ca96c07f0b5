use clap::Args;
use stassh::{DirectConnection, PortForward, Profile, ProxyJump};

const SSH_PORT: u16 = 22;

/// Field flags for one profile kind. Every flag is optional: `add` applies
/// them over [`FieldArgs::template`], `update` and `duplicate` over the
/// stored profile.
pub trait FieldArgs: Args {
    type Profile: Profile;

    fn template() -> Self::Profile;
    fn name(&self) -> Option<&str>;
    fn is_empty(&self) -> bool;
    fn apply(self, profile: &mut Self::Profile);

    fn build(self) -> Self::Profile {
        let mut profile = Self::template();
        self.apply(&mut profile);
        profile
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

#[derive(Args, Debug, Default)]
pub struct DirectFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    /// Private key file; pass an empty value to clear it.
    #[arg(long, value_name = "PATH")]
    pub key: Option<String>,
}

impl FieldArgs for DirectFields {
    type Profile = DirectConnection;

    fn template() -> DirectConnection {
        DirectConnection {
            port: SSH_PORT,
            ..DirectConnection::default()
        }
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.user.is_none()
            && self.host.is_none()
            && self.port.is_none()
            && self.key.is_none()
    }

    fn apply(self, profile: &mut DirectConnection) {
        set(&mut profile.name, self.name);
        set(&mut profile.user, self.user);
        set(&mut profile.host, self.host);
        set(&mut profile.port, self.port);
        set(&mut profile.key, self.key);
    }
}

#[derive(Args, Debug, Default)]
pub struct ForwardFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub local_port: Option<u16>,
    #[arg(long)]
    pub target_host: Option<String>,
    #[arg(long)]
    pub target_port: Option<u16>,
    #[arg(long = "server-user")]
    pub remote_server_user: Option<String>,
    #[arg(long = "server-host")]
    pub remote_server_host: Option<String>,
    #[arg(long = "server-port")]
    pub remote_server_port: Option<u16>,
    /// Private key file; pass an empty value to clear it.
    #[arg(long, value_name = "PATH")]
    pub key: Option<String>,
}

impl FieldArgs for ForwardFields {
    type Profile = PortForward;

    fn template() -> PortForward {
        PortForward {
            remote_server_port: SSH_PORT,
            ..PortForward::default()
        }
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.notes.is_none()
            && self.local_port.is_none()
            && self.target_host.is_none()
            && self.target_port.is_none()
            && self.remote_server_user.is_none()
            && self.remote_server_host.is_none()
            && self.remote_server_port.is_none()
            && self.key.is_none()
    }

    fn apply(self, profile: &mut PortForward) {
        set(&mut profile.name, self.name);
        set(&mut profile.notes, self.notes);
        set(&mut profile.local_port, self.local_port);
        set(&mut profile.target_host, self.target_host);
        set(&mut profile.target_port, self.target_port);
        set(&mut profile.remote_server_user, self.remote_server_user);
        set(&mut profile.remote_server_host, self.remote_server_host);
        set(&mut profile.remote_server_port, self.remote_server_port);
        set(&mut profile.key, self.key);
    }
}

#[derive(Args, Debug, Default)]
pub struct JumpFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub target_user: Option<String>,
    #[arg(long)]
    pub target_host: Option<String>,
    #[arg(long)]
    pub target_port: Option<u16>,
    #[arg(long)]
    pub jump_user: Option<String>,
    #[arg(long)]
    pub jump_host: Option<String>,
    #[arg(long)]
    pub jump_port: Option<u16>,
    /// Private key file; pass an empty value to clear it.
    #[arg(long, value_name = "PATH")]
    pub key: Option<String>,
    #[arg(long)]
    pub device_type: Option<String>,
}

impl FieldArgs for JumpFields {
    type Profile = ProxyJump;

    fn template() -> ProxyJump {
        ProxyJump {
            target_port: SSH_PORT,
            jump_port: SSH_PORT,
            ..ProxyJump::default()
        }
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.target_user.is_none()
            && self.target_host.is_none()
            && self.target_port.is_none()
            && self.jump_user.is_none()
            && self.jump_host.is_none()
            && self.jump_port.is_none()
            && self.key.is_none()
            && self.device_type.is_none()
    }

    fn apply(self, profile: &mut ProxyJump) {
        set(&mut profile.name, self.name);
        set(&mut profile.target_user, self.target_user);
        set(&mut profile.target_host, self.target_host);
        set(&mut profile.target_port, self.target_port);
        set(&mut profile.jump_user, self.jump_user);
        set(&mut profile.jump_host, self.jump_host);
        set(&mut profile.jump_port, self.jump_port);
        set(&mut profile.key, self.key);
        set(&mut profile.device_type, self.device_type);
    }
}
