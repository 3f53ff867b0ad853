//! TelloTerm: a terminal flight dashboard for the Tello drone.
//!
//! Telemetry feeds a registry of display fields that a render loop paints at a
//! fixed cadence, while keyboard and joystick input become drone commands.

pub mod config;
pub mod drone;
pub mod fields;
pub mod input;
mod lock;
pub mod render;
pub mod session;
pub mod tasks;
pub mod telemetry;
pub mod terminal_restore;
pub mod trace_log;
pub mod utf8_safe;
pub mod video;

pub use config::AppConfig;
pub use session::{run_terminal, InputFeed, Session};
pub use trace_log::{init_stderr_tracing, init_tracing, tracing_log_path};
