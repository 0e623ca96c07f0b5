//! Renders profiles into `ssh` invocations.
//!
//! Every function here is pure. The argument vector is the form meant for a
//! process launcher; the `Display` rendering reproduces the historical
//! space-joined command line with field values inserted verbatim.

use crate::model::{DirectConnection, PortForward, ProxyJump};
use std::fmt;

pub const SSH_PROGRAM: &str = "ssh";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshCommand {
    program: String,
    args: Vec<String>,
}

impl SshCommand {
    fn new() -> Self {
        Self {
            program: SSH_PROGRAM.to_string(),
            args: Vec::new(),
        }
    }

    fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn identity(self, key: &str) -> Self {
        if key.is_empty() {
            self
        } else {
            self.arg("-i").arg(key)
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Command line with every token quoted for a POSIX shell.
    pub fn shell_line(&self) -> String {
        shell_words::join(self.argv())
    }
}

impl fmt::Display for SshCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// `ssh [-i <key>] <user>@<host> -p<port>`
pub fn direct_connection(connection: &DirectConnection) -> SshCommand {
    SshCommand::new()
        .identity(&connection.key)
        .arg(connection.target())
        .arg(format!("-p{}", connection.port))
}

/// `ssh -N -L <local>:<target_host>:<target_port> <user>@<server> -p<port> [-i <key>]`
pub fn port_forward(forward: &PortForward) -> SshCommand {
    SshCommand::new()
        .arg("-N")
        .arg("-L")
        .arg(forward.forward_spec())
        .arg(forward.remote_server())
        .arg(format!("-p{}", forward.remote_server_port))
        .identity(&forward.key)
}

/// `ssh [-i <key>] -J <jump_user>@<jump_host>:<jump_port> <user>@<target> -p<port>`
pub fn proxy_jump(jump: &ProxyJump) -> SshCommand {
    SshCommand::new()
        .identity(&jump.key)
        .arg("-J")
        .arg(jump.jump())
        .arg(jump.target())
        .arg(format!("-p{}", jump.target_port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Profile;

    fn direct(key: &str) -> DirectConnection {
        DirectConnection {
            name: "box".to_string(),
            user: "alice".to_string(),
            host: "10.0.0.5".to_string(),
            port: 22,
            key: key.to_string(),
        }
    }

    fn forward(key: &str) -> PortForward {
        PortForward {
            name: "db".to_string(),
            notes: String::new(),
            local_port: 8080,
            target_host: "db.internal".to_string(),
            target_port: 5432,
            remote_server_user: "bob".to_string(),
            remote_server_host: "bastion".to_string(),
            remote_server_port: 22,
            key: key.to_string(),
        }
    }

    fn jump(key: &str) -> ProxyJump {
        ProxyJump {
            name: "switch".to_string(),
            target_user: "admin".to_string(),
            target_host: "10.1.1.1".to_string(),
            target_port: 22,
            jump_user: "ops".to_string(),
            jump_host: "gw.example.com".to_string(),
            jump_port: 2222,
            key: key.to_string(),
            device_type: "cisco".to_string(),
        }
    }

    #[test]
    fn direct_connection_without_key() {
        let command = direct("").command();
        assert_eq!(command.to_string(), "ssh alice@10.0.0.5 -p22");
        assert_eq!(command.program(), SSH_PROGRAM);
        assert!(!command.args().iter().any(|arg| arg == "-i"));
    }

    #[test]
    fn direct_connection_with_key() {
        let command = direct("/k").command();
        assert_eq!(command.to_string(), "ssh -i /k alice@10.0.0.5 -p22");
        assert_eq!(command.argv(), ["ssh", "-i", "/k", "alice@10.0.0.5", "-p22"]);
    }

    #[test]
    fn port_forward_without_key() {
        assert_eq!(
            forward("").command().to_string(),
            "ssh -N -L 8080:db.internal:5432 bob@bastion -p22"
        );
    }

    #[test]
    fn port_forward_key_goes_last() {
        assert_eq!(
            forward("~/.ssh/id_ed25519").command().to_string(),
            "ssh -N -L 8080:db.internal:5432 bob@bastion -p22 -i ~/.ssh/id_ed25519"
        );
    }

    #[test]
    fn proxy_jump_with_and_without_key() {
        assert_eq!(
            jump("").command().to_string(),
            "ssh -J ops@gw.example.com:2222 admin@10.1.1.1 -p22"
        );
        assert_eq!(
            jump("/keys/ops").command().to_string(),
            "ssh -i /keys/ops -J ops@gw.example.com:2222 admin@10.1.1.1 -p22"
        );
    }

    #[test]
    fn argv_keeps_metacharacters_in_a_single_token() {
        let mut connection = direct("/tmp/my key");
        connection.host = "example.com; rm -rf ~".to_string();
        let argv = connection.command().argv();
        assert_eq!(argv[2], "/tmp/my key");
        assert_eq!(argv[3], "alice@example.com; rm -rf ~");
    }

    #[test]
    fn shell_line_quotes_unsafe_tokens() {
        let mut connection = direct("/tmp/my key");
        connection.host = "example.com;id".to_string();
        let line = connection.command().shell_line();
        assert_eq!(line, "ssh -i '/tmp/my key' 'alice@example.com;id' -p22");
        assert_eq!(shell_words::split(&line).unwrap(), connection.command().argv());
    }

    #[test]
    fn shell_line_splits_back_into_argv() {
        let command = forward("/keys/bob").command();
        let line = command.shell_line();
        assert!(line.starts_with("ssh -N -L "));
        assert_eq!(shell_words::split(&line).unwrap(), command.argv());
    }
}
