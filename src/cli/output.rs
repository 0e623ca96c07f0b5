use crate::cli::theme::CliTheme;
use crossterm::style::{Color, Stylize};
use stassh::{DirectConnection, PortForward, Profile, ProxyJump, Store};
use std::io::IsTerminal;

#[derive(Clone, Copy)]
pub enum Role {
    Name,
    Target,
    Port,
    Key,
    Plain,
}

/// Table layout of a profile kind for `list`.
pub trait Columns: Profile {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<(Role, String)>;
}

fn key_cell(key: &str) -> String {
    if key.is_empty() {
        "-".to_string()
    } else {
        key.to_string()
    }
}

impl Columns for DirectConnection {
    const HEADERS: &'static [&'static str] = &["NAME", "TARGET", "PORT", "KEY"];

    fn cells(&self) -> Vec<(Role, String)> {
        vec![
            (Role::Name, self.name.clone()),
            (Role::Target, self.target()),
            (Role::Port, self.port.to_string()),
            (Role::Key, key_cell(&self.key)),
        ]
    }
}

impl Columns for PortForward {
    const HEADERS: &'static [&'static str] =
        &["NAME", "FORWARD", "SERVER", "PORT", "KEY", "NOTES"];

    fn cells(&self) -> Vec<(Role, String)> {
        vec![
            (Role::Name, self.name.clone()),
            (Role::Plain, self.forward_spec()),
            (Role::Target, self.remote_server()),
            (Role::Port, self.remote_server_port.to_string()),
            (Role::Key, key_cell(&self.key)),
            (Role::Plain, self.notes.clone()),
        ]
    }
}

impl Columns for ProxyJump {
    const HEADERS: &'static [&'static str] =
        &["NAME", "TARGET", "PORT", "JUMP", "KEY", "DEVICE"];

    fn cells(&self) -> Vec<(Role, String)> {
        vec![
            (Role::Name, self.name.clone()),
            (Role::Target, self.target()),
            (Role::Port, self.target_port.to_string()),
            (Role::Plain, self.jump()),
            (Role::Key, key_cell(&self.key)),
            (Role::Plain, self.device_type.clone()),
        ]
    }
}

/// Prints the entries at `indices`, labelled with their store position.
pub fn print_profiles<P: Columns>(store: &Store<P>, indices: &[usize], theme: &CliTheme) {
    if indices.is_empty() {
        println!("No {}s found.", P::KIND.label());
        return;
    }

    let use_color = theme.enabled && std::io::stdout().is_terminal();
    let header: Vec<String> = std::iter::once("#")
        .chain(P::HEADERS.iter().copied())
        .map(|title| colorize(title, theme.header, use_color))
        .collect();
    println!("{}", header.join("\t"));

    for &index in indices {
        let Ok(profile) = store.get(index) else {
            continue;
        };
        let row: Vec<String> = std::iter::once(colorize(&index.to_string(), theme.index, use_color))
            .chain(
                profile
                    .cells()
                    .into_iter()
                    .map(|(role, text)| colorize(&text, role_color(role, theme), use_color)),
            )
            .collect();
        println!("{}", row.join("\t"));
    }
}

fn role_color(role: Role, theme: &CliTheme) -> Color {
    match role {
        Role::Name => theme.name,
        Role::Target => theme.target,
        Role::Port => theme.port,
        Role::Key => theme.key,
        Role::Plain => Color::Reset,
    }
}

fn colorize(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        format!("{}", text.with(color))
    } else {
        text.to_string()
    }
}
