//! Command-line parsing and validation helpers.

mod defaults;
#[cfg(test)]
mod tests;
mod validation;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub use defaults::{DEFAULT_DRONE_ADDR, DEFAULT_PLAYER, PLAYER_FPS_HINT};

/// Controller families with a built-in axis/button mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JoystickType {
    /// Sony DualShock 4 (mapping differs between Windows and other hosts)
    #[value(name = "DualShock4", alias = "dualshock4")]
    DualShock4,
    /// Thrustmaster T-Flight HOTAS X
    #[value(name = "HotasX", alias = "hotasx")]
    HotasX,
    /// Mapping loaded from the YAML file given with --jsmap
    #[value(name = "custom")]
    Custom,
}

impl JoystickType {
    pub fn label(self) -> &'static str {
        match self {
            JoystickType::DualShock4 => "DualShock4",
            JoystickType::HotasX => "HotasX",
            JoystickType::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// CLI options for TelloTerm. Validated values keep the session startup simple.
#[derive(Debug, Parser, Clone)]
#[command(about = "TelloTerm - terminal flight dashboard for the Tello drone", author, version)]
pub struct AppConfig {
    /// Log some CSV flight data to this file
    #[arg(long = "fdlog", value_name = "FILE")]
    pub fdlog: Option<PathBuf>,

    /// Print help for keyboard control mapping and exit
    #[arg(long = "keyhelp", default_value_t = false)]
    pub keyhelp: bool,

    /// Print help for joystick control mapping and exit
    #[arg(long = "joyhelp", default_value_t = false)]
    pub joyhelp: bool,

    /// List attached joysticks and exit
    #[arg(long = "jslist", default_value_t = false)]
    pub jslist: bool,

    /// Debug joystick mapping without connecting to the drone
    #[arg(long = "jstest", default_value_t = false)]
    pub jstest: bool,

    /// ID number of joystick to use (see --jslist to get IDs)
    #[arg(long = "jsid", value_name = "ID")]
    pub jsid: Option<usize>,

    /// Type of joystick
    #[arg(long = "jstype", value_enum)]
    pub jstype: Option<JoystickType>,

    /// YAML joystick mapping used with --jstype custom
    #[arg(long = "jsmap", value_name = "FILE")]
    pub jsmap: Option<PathBuf>,

    /// Use '-vo x11' in case the player takes over the entire window
    #[arg(long = "x11", default_value_t = false)]
    pub x11: bool,

    /// Full video player command line (replaces the built-in mplayer invocation)
    #[arg(long = "player-cmd", value_name = "CMD")]
    pub player_cmd: Option<String>,

    /// Fly the built-in simulator instead of a real drone
    #[arg(long = "sim", default_value_t = false)]
    pub sim: bool,

    /// IP address of the drone
    #[arg(long = "drone-addr", default_value = DEFAULT_DRONE_ADDR)]
    pub drone_addr: String,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "TELLOTERM_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs)
    #[arg(long = "no-logs", env = "TELLOTERM_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Minimum level written to the log
    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl AppConfig {
    /// Joystick input is only wired up when both a device and a mapping are given.
    pub fn joystick_enabled(&self) -> bool {
        self.jsid.is_some() && self.jstype.is_some()
    }

    pub fn logging_enabled(&self) -> bool {
        self.logs && !self.no_logs
    }
}
