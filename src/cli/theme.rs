use crossterm::style::Color;
use stassh::config::ThemeConfig;

pub struct CliTheme {
    pub enabled: bool,
    pub header: Color,
    pub index: Color,
    pub name: Color,
    pub target: Color,
    pub port: Color,
    pub key: Color,
}

impl CliTheme {
    pub fn from_config(config: &ThemeConfig) -> Self {
        Self {
            enabled: config.enabled,
            header: parse_color(&config.header),
            index: parse_color(&config.index),
            name: parse_color(&config.name),
            target: parse_color(&config.target),
            port: parse_color(&config.port),
            key: parse_color(&config.key),
        }
    }
}

fn parse_color(name: &str) -> Color {
    match name.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::DarkRed,
        "green" => Color::DarkGreen,
        "yellow" => Color::DarkYellow,
        "blue" => Color::DarkBlue,
        "magenta" => Color::DarkMagenta,
        "cyan" => Color::DarkCyan,
        "gray" | "grey" => Color::Grey,
        "darkgray" | "dark_gray" | "darkgrey" | "dark_grey" => Color::DarkGrey,
        "lightred" | "light_red" => Color::Red,
        "lightgreen" | "light_green" => Color::Green,
        "lightyellow" | "light_yellow" => Color::Yellow,
        "lightblue" | "light_blue" => Color::Blue,
        "lightmagenta" | "light_magenta" => Color::Magenta,
        "lightcyan" | "light_cyan" => Color::Cyan,
        _ => Color::White,
    }
}
