//! Boundary to the drone: the command vocabulary the dashboard speaks, the
//! `DroneLink` trait every backend implements, and the two backends (UDP SDK for
//! real hardware, an in-process simulator for offline flying and tests).

mod broadcast;
mod flight_data;
mod rc;
pub mod sdk;
pub mod sim;

use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;

use crate::config::AppConfig;

pub(crate) use broadcast::Broadcast;
pub(crate) use flight_data::quaternion_from_euler_deg;
pub use flight_data::{FlightData, ImuData, MvoData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    Forward,
    Back,
    Left,
    Right,
}

/// One-way request to the drone. Movement variants carry a speed percentage (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DroneCommand {
    Forward(u8),
    Backward(u8),
    Left(u8),
    Right(u8),
    Up(u8),
    Down(u8),
    TurnLeft(u8),
    TurnRight(u8),
    Hover,
    TakeOff,
    ThrowTakeOff,
    Land,
    PalmLand,
    Bounce,
    Flip(FlipDirection),
    SmartVideo360,
    TakePicture,
    StartVideo,
    FastMode,
    SlowMode,
    VideoWide,
    VideoNormal,
    SetHome,
    FlyHome,
    QueryLowBatteryThreshold,
    QueryMaxHeight,
    QuerySsid,
    QueryVersion,
}

impl DroneCommand {
    pub fn label(self) -> &'static str {
        match self {
            DroneCommand::Forward(_) => "forward",
            DroneCommand::Backward(_) => "backward",
            DroneCommand::Left(_) => "left",
            DroneCommand::Right(_) => "right",
            DroneCommand::Up(_) => "up",
            DroneCommand::Down(_) => "down",
            DroneCommand::TurnLeft(_) => "turn-left",
            DroneCommand::TurnRight(_) => "turn-right",
            DroneCommand::Hover => "hover",
            DroneCommand::TakeOff => "takeoff",
            DroneCommand::ThrowTakeOff => "throw-takeoff",
            DroneCommand::Land => "land",
            DroneCommand::PalmLand => "palm-land",
            DroneCommand::Bounce => "bounce",
            DroneCommand::Flip(_) => "flip",
            DroneCommand::SmartVideo360 => "smart-video-360",
            DroneCommand::TakePicture => "take-picture",
            DroneCommand::StartVideo => "start-video",
            DroneCommand::FastMode => "fast-mode",
            DroneCommand::SlowMode => "slow-mode",
            DroneCommand::VideoWide => "video-wide",
            DroneCommand::VideoNormal => "video-normal",
            DroneCommand::SetHome => "set-home",
            DroneCommand::FlyHome => "fly-home",
            DroneCommand::QueryLowBatteryThreshold => "query-low-battery-threshold",
            DroneCommand::QueryMaxHeight => "query-max-height",
            DroneCommand::QuerySsid => "query-ssid",
            DroneCommand::QueryVersion => "query-version",
        }
    }
}

/// Filtered analog sample of both sticks, full `i16` range, up/right positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StickMessage {
    pub lx: i16,
    pub ly: i16,
    pub rx: i16,
    pub ry: i16,
}

/// Fire-and-forget handle for issuing commands. Never blocks and never reports
/// whether the drone acted on a command.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<DroneCommand>,
}

impl CommandSender {
    pub fn send(&self, command: DroneCommand) {
        if self.tx.send(command).is_err() {
            tracing::debug!("drone link gone; dropped {}", command.label());
        }
    }
}

/// Unbounded command channel shared by the keyboard, joystick and video relay.
pub fn command_channel() -> (CommandSender, Receiver<DroneCommand>) {
    let (tx, rx) = unbounded();
    (CommandSender { tx }, rx)
}

/// Everything the dashboard needs from a connected drone.
pub trait DroneLink: Send + Sync {
    fn commands(&self) -> CommandSender;

    /// Push stream of telemetry snapshots.
    fn subscribe_telemetry(&self) -> Result<Receiver<FlightData>>;

    /// Push stream of raw video bytes; flows only while start-video is re-asserted.
    fn subscribe_video(&self) -> Result<Receiver<Vec<u8>>>;

    /// Channel for continuous stick input.
    fn stick_sender(&self) -> Result<Sender<StickMessage>>;

    fn picture_count(&self) -> usize;

    /// Write every captured picture under `prefix`; returns how many were written.
    fn save_all_pictures(&self, prefix: &str) -> Result<usize>;

    fn is_home_set(&self) -> bool;

    /// Stop background I/O. Called once during session teardown.
    fn disconnect(&self) {}
}

/// Connect to the drone selected by the configuration.
pub fn connect(config: &AppConfig) -> Result<Arc<dyn DroneLink>> {
    if config.sim {
        tracing::info!("starting simulated drone");
        return Ok(Arc::new(sim::SimDrone::start()));
    }
    let addr = config.drone_addr.parse()?;
    Ok(Arc::new(sdk::SdkDrone::connect(addr)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_sender_delivers_in_order() {
        let (commands, rx) = command_channel();
        commands.send(DroneCommand::TakeOff);
        commands.send(DroneCommand::Forward(33));
        assert_eq!(rx.try_recv(), Ok(DroneCommand::TakeOff));
        assert_eq!(rx.try_recv(), Ok(DroneCommand::Forward(33)));
    }

    #[test]
    fn command_sender_ignores_closed_link() {
        let (commands, rx) = command_channel();
        drop(rx);
        commands.send(DroneCommand::Land);
    }
}
