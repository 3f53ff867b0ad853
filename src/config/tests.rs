use super::{AppConfig, JoystickType, DEFAULT_DRONE_ADDR};
use clap::Parser;
use std::env;
use std::fs;

#[test]
fn defaults_validate() {
    let mut cfg = AppConfig::parse_from(["telloterm"]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.drone_addr, DEFAULT_DRONE_ADDR);
    assert!(!cfg.joystick_enabled());
    assert!(!cfg.logging_enabled());
}

#[test]
fn rejects_jsid_without_type() {
    let mut cfg = AppConfig::parse_from(["telloterm", "--jsid", "0"]);
    let err = cfg.validate().expect_err("jsid alone is invalid");
    assert!(err.to_string().contains("No joystick type supplied"));
}

#[test]
fn rejects_type_without_jsid() {
    let mut cfg = AppConfig::parse_from(["telloterm", "--jstype", "HotasX"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn accepts_joystick_pair() {
    let mut cfg = AppConfig::parse_from(["telloterm", "--jsid", "1", "--jstype", "DualShock4"]);
    assert!(cfg.validate().is_ok());
    assert!(cfg.joystick_enabled());
    assert_eq!(cfg.jstype, Some(JoystickType::DualShock4));
}

#[test]
fn jstype_accepts_lowercase_alias() {
    let cfg = AppConfig::parse_from(["telloterm", "--jsid", "0", "--jstype", "hotasx"]);
    assert_eq!(cfg.jstype, Some(JoystickType::HotasX));
}

#[test]
fn jstest_requires_device() {
    let mut cfg = AppConfig::parse_from(["telloterm", "--jstest"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn custom_mapping_requires_file() {
    let mut cfg = AppConfig::parse_from(["telloterm", "--jsid", "0", "--jstype", "custom"]);
    assert!(cfg.validate().is_err());

    let missing = env::temp_dir().join("telloterm-missing-map.yaml");
    let _ = fs::remove_file(&missing);
    let mut cfg = AppConfig::parse_from([
        "telloterm",
        "--jsid",
        "0",
        "--jstype",
        "custom",
        "--jsmap",
        missing.to_str().expect("utf8 path"),
    ]);
    assert!(cfg.validate().is_err());
}

#[test]
fn jsmap_without_custom_type_is_rejected() {
    let mut cfg = AppConfig::parse_from([
        "telloterm",
        "--jsid",
        "0",
        "--jstype",
        "HotasX",
        "--jsmap",
        "map.yaml",
    ]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_fdlog_in_missing_directory() {
    let path = env::temp_dir()
        .join("telloterm-no-such-dir")
        .join("flight.csv");
    let mut cfg = AppConfig::parse_from(["telloterm", "--fdlog", path.to_str().expect("utf8")]);
    assert!(cfg.validate().is_err());
}

#[test]
fn accepts_fdlog_in_current_directory() {
    let mut cfg = AppConfig::parse_from(["telloterm", "--fdlog", "flight.csv"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_non_ip_drone_addr() {
    let mut cfg = AppConfig::parse_from(["telloterm", "--drone-addr", "tello.local"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn trims_drone_addr() {
    let mut cfg = AppConfig::parse_from(["telloterm", "--drone-addr", " 10.0.0.7 "]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.drone_addr, "10.0.0.7");
}

#[test]
fn default_player_command() {
    let cfg = AppConfig::parse_from(["telloterm"]);
    let (program, args) = cfg.player_command().expect("player command");
    assert_eq!(program, "mplayer");
    assert_eq!(args, ["-nosound", "-fps", "60", "-"]);
}

#[test]
fn x11_player_command() {
    let cfg = AppConfig::parse_from(["telloterm", "--x11"]);
    let (program, args) = cfg.player_command().expect("player command");
    assert_eq!(program, "mplayer");
    assert_eq!(args, ["-nosound", "-vo", "x11", "-fps", "60", "-"]);
}

#[test]
fn custom_player_command_is_shell_split() {
    let mut cfg = AppConfig::parse_from([
        "telloterm",
        "--player-cmd",
        "ffplay -fflags nobuffer -window_title 'Tello video' -",
    ]);
    assert!(cfg.validate().is_ok());
    let (program, args) = cfg.player_command().expect("player command");
    assert_eq!(program, "ffplay");
    assert_eq!(
        args,
        ["-fflags", "nobuffer", "-window_title", "Tello video", "-"]
    );
}

#[test]
fn rejects_empty_or_unbalanced_player_command() {
    let mut cfg = AppConfig::parse_from(["telloterm", "--player-cmd", "   "]);
    assert!(cfg.validate().is_err());
    let mut cfg = AppConfig::parse_from(["telloterm", "--player-cmd", "mpv 'unterminated"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn no_logs_overrides_logs() {
    let cfg = AppConfig::parse_from(["telloterm", "--logs", "--no-logs"]);
    assert!(!cfg.logging_enabled());
    let cfg = AppConfig::parse_from(["telloterm", "--logs"]);
    assert!(cfg.logging_enabled());
}
