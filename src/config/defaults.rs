/// Address the drone answers on when the host joins its access point.
pub const DEFAULT_DRONE_ADDR: &str = "192.168.10.1";

/// Video player launched by the relay unless `--player-cmd` overrides it.
pub const DEFAULT_PLAYER: &str = "mplayer";

/// Frame-rate hint handed to the player; 60 gives the smoothest playback.
pub const PLAYER_FPS_HINT: &str = "60";

pub(super) const MAX_PLAYER_ARGS: usize = 32;
