use super::defaults::{DEFAULT_PLAYER, MAX_PLAYER_ARGS, PLAYER_FPS_HINT};
use super::{AppConfig, JoystickType};
use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::net::IpAddr;
use std::path::Path;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check flag combinations and normalize values.
    pub fn validate(&mut self) -> Result<()> {
        if self.jsid.is_some() && self.jstype.is_none() {
            bail!("No joystick type supplied, please use --jstype option");
        }
        if self.jstype.is_some() && self.jsid.is_none() {
            bail!("--jstype requires --jsid (see --jslist to get IDs)");
        }
        if self.jstest && !self.joystick_enabled() {
            bail!("--jstest requires both --jsid and --jstype");
        }

        match (self.jstype, self.jsmap.as_ref()) {
            (Some(JoystickType::Custom), None) => {
                bail!("--jstype custom requires a mapping file via --jsmap")
            }
            (Some(JoystickType::Custom), Some(path)) if !path.is_file() => {
                bail!("--jsmap file not found: {}", path.display())
            }
            (Some(JoystickType::Custom), Some(_)) => {}
            (_, Some(_)) => bail!("--jsmap is only used with --jstype custom"),
            (_, None) => {}
        }

        if let Some(path) = self.fdlog.as_ref() {
            ensure_parent_dir(path)?;
        }

        if let Some(cmd) = self.player_cmd.as_deref() {
            let words = split_player_cmd(cmd)?;
            if words.len() > MAX_PLAYER_ARGS {
                bail!(
                    "--player-cmd has {} words; at most {MAX_PLAYER_ARGS} are allowed",
                    words.len()
                );
            }
        }

        let addr = self.drone_addr.trim();
        addr.parse::<IpAddr>()
            .with_context(|| format!("--drone-addr must be an IP address, got {addr:?}"))?;
        self.drone_addr = addr.to_string();

        Ok(())
    }

    /// Program and arguments used to start the external video player.
    pub fn player_command(&self) -> Result<(String, Vec<String>)> {
        if let Some(cmd) = self.player_cmd.as_deref() {
            let mut words = split_player_cmd(cmd)?;
            let program = words.remove(0);
            return Ok((program, words));
        }
        let mut args = vec!["-nosound".to_string()];
        if self.x11 {
            args.push("-vo".to_string());
            args.push("x11".to_string());
        }
        args.push("-fps".to_string());
        args.push(PLAYER_FPS_HINT.to_string());
        args.push("-".to_string());
        Ok((DEFAULT_PLAYER.to_string(), args))
    }
}

fn split_player_cmd(cmd: &str) -> Result<Vec<String>> {
    let words = shell_words::split(cmd)
        .map_err(|err| anyhow!("--player-cmd could not be parsed: {err}"))?;
    if words.is_empty() {
        bail!("--player-cmd must name a program");
    }
    Ok(words)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            bail!(
                "--fdlog directory does not exist: {}",
                parent.display()
            )
        }
        _ => Ok(()),
    }
}
