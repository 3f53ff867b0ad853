//! TelloTerm entrypoint: parses flags, handles the print-and-exit modes and
//! otherwise hands the terminal to the flight dashboard.
//!
//! # Threads
//!
//! - Telemetry: drone snapshots into the field registry (and flight log)
//! - Render: repaints the dashboard every 50 ms
//! - Input: terminal key events
//! - Joystick: polls the controller when `--jsid`/`--jstype` are given
//! - Video: keep-alive and player relay, once `v` is pressed

mod cli_utils;
mod help;

use anyhow::Result;
use std::io;
use std::process::ExitCode;
use telloterm::render::{shared_screen, CrosstermScreen};
use telloterm::terminal_restore::TerminalRestoreGuard;
use telloterm::{init_stderr_tracing, init_tracing, run_terminal, tracing_log_path, AppConfig};

use crate::cli_utils::{print_joysticks, run_joystick_test};
use crate::help::{joystick_help, key_help};

fn main() -> ExitCode {
    let config = match AppConfig::parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("telloterm: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("telloterm: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &AppConfig) -> Result<()> {
    if config.keyhelp {
        print!("{}", key_help());
        return Ok(());
    }
    if config.joyhelp {
        print!("{}", joystick_help());
        return Ok(());
    }
    if config.jslist {
        init_stderr_tracing(config);
        return print_joysticks();
    }
    if config.jstest {
        init_stderr_tracing(config);
        return run_joystick_test(config);
    }

    init_tracing(config);
    if config.logging_enabled() {
        tracing::info!("=== TelloTerm started, trace log {:?} ===", tracing_log_path());
    }

    let guard = TerminalRestoreGuard::new();
    let mut stdout = io::stdout();
    guard.enable_raw_mode()?;
    guard.enter_alt_screen(&mut stdout)?;
    guard.hide_cursor(&mut stdout)?;

    let result = run_terminal(config, shared_screen(CrosstermScreen::new()));
    guard.restore();
    if let Err(err) = &result {
        tracing::error!("session ended with error: {err:#}");
    } else {
        tracing::info!("=== TelloTerm exited ===");
    }
    result
}
