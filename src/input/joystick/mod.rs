//! Joystick polling: raw device state in, filtered stick samples and
//! edge-triggered button commands out.

mod config;
mod gilrs_device;
#[cfg(test)]
mod tests;

use anyhow::Result;
use crossbeam_channel::{SendTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::drone::{CommandSender, DroneCommand, StickMessage};
use crate::tasks::StopFlag;

pub use config::{AxisMap, ButtonMap, JoystickConfig, DUALSHOCK4, HOTAS_X};
pub use gilrs_device::{list_joysticks, GilrsJoystick};

pub const POLL_PERIOD: Duration = Duration::from_millis(50);
/// Axis magnitudes below this read as centered.
pub const DEAD_ZONE: u16 = 2000;

/// One read of the device: axis values in device order and a button bitmask
/// (bit n set = button n held).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawState {
    pub axes: Vec<i16>,
    pub buttons: u32,
}

pub trait JoystickDevice {
    fn read(&mut self) -> Result<RawState>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalButton {
    L1,
    L2,
    Square,
    Triangle,
    Circle,
    X,
    L3,
    R1,
    R2,
    R3,
}

impl LogicalButton {
    /// Edge-scan order.
    pub const ALL: [LogicalButton; 10] = [
        LogicalButton::L1,
        LogicalButton::L2,
        LogicalButton::Square,
        LogicalButton::Triangle,
        LogicalButton::Circle,
        LogicalButton::X,
        LogicalButton::L3,
        LogicalButton::R1,
        LogicalButton::R2,
        LogicalButton::R3,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LogicalButton::L1 => "L1",
            LogicalButton::L2 => "L2",
            LogicalButton::Square => "Square",
            LogicalButton::Triangle => "Triangle",
            LogicalButton::Circle => "Circle",
            LogicalButton::X => "X",
            LogicalButton::L3 => "L3",
            LogicalButton::R1 => "R1",
            LogicalButton::R2 => "R2",
            LogicalButton::R3 => "R3",
        }
    }

    /// Drone command bound to the button, if any.
    pub fn command(self) -> Option<DroneCommand> {
        match self {
            LogicalButton::L1 => Some(DroneCommand::Bounce),
            LogicalButton::L2 => Some(DroneCommand::PalmLand),
            LogicalButton::Square => Some(DroneCommand::TakePicture),
            LogicalButton::Triangle => Some(DroneCommand::TakeOff),
            LogicalButton::X => Some(DroneCommand::Land),
            _ => None,
        }
    }

    fn index(self, buttons: &ButtonMap) -> Option<u8> {
        match self {
            LogicalButton::L1 => buttons.l1,
            LogicalButton::L2 => buttons.l2,
            LogicalButton::Square => buttons.square,
            LogicalButton::Triangle => buttons.triangle,
            LogicalButton::Circle => buttons.circle,
            LogicalButton::X => buttons.x,
            LogicalButton::L3 => buttons.l3,
            LogicalButton::R1 => buttons.r1,
            LogicalButton::R2 => buttons.r2,
            LogicalButton::R3 => buttons.r3,
        }
    }
}

pub fn apply_dead_zone(value: i16) -> i16 {
    if value.unsigned_abs() < DEAD_ZONE {
        0
    } else {
        value
    }
}

/// Select the four stick axes, flip both Y axes so up is positive, then
/// zero anything inside the dead-zone. Missing axes read as 0.
pub fn stick_message(state: &RawState, axes: &AxisMap) -> StickMessage {
    let axis = |index: usize| state.axes.get(index).copied().unwrap_or(0);
    StickMessage {
        lx: apply_dead_zone(axis(axes.left_x)),
        ly: apply_dead_zone(axis(axes.left_y).saturating_neg()),
        rx: apply_dead_zone(axis(axes.right_x)),
        ry: apply_dead_zone(axis(axes.right_y).saturating_neg()),
    }
}

/// Buttons that went from released to pressed between two bitmasks.
pub fn pressed_edges(prev: u32, current: u32, buttons: &ButtonMap) -> Vec<LogicalButton> {
    LogicalButton::ALL
        .into_iter()
        .filter(|button| {
            button.index(buttons).is_some_and(|index| {
                let bit = 1u32.checked_shl(u32::from(index)).unwrap_or(0);
                current & bit != 0 && prev & bit == 0
            })
        })
        .collect()
}

/// Where a poll cycle's output goes.
pub trait JoystickSink {
    fn stick(&mut self, message: StickMessage);
    fn pressed(&mut self, button: LogicalButton);
}

/// Live flying: sticks to the drone's stick channel, bound buttons to commands.
pub struct DroneSink {
    sticks: Sender<StickMessage>,
    commands: CommandSender,
}

impl DroneSink {
    pub fn new(sticks: Sender<StickMessage>, commands: CommandSender) -> Self {
        Self { sticks, commands }
    }
}

impl JoystickSink for DroneSink {
    fn stick(&mut self, message: StickMessage) {
        match self.sticks.send_timeout(message, POLL_PERIOD) {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(_)) => {
                tracing::debug!("stick channel full; sample dropped");
            }
            Err(SendTimeoutError::Disconnected(_)) => tracing::debug!("stick channel closed"),
        }
    }

    fn pressed(&mut self, button: LogicalButton) {
        match button.command() {
            Some(command) => {
                tracing::info!("joystick {} -> {}", button.label(), command.label());
                self.commands.send(command);
            }
            None => tracing::debug!("joystick {} pressed (unbound)", button.label()),
        }
    }
}

/// `--jstest`: report everything, command nothing.
#[derive(Debug, Default)]
pub struct DiagnosticSink;

impl JoystickSink for DiagnosticSink {
    fn stick(&mut self, m: StickMessage) {
        tracing::info!("JS: Lx: {}, Ly: {}, Rx: {}, Ry: {}", m.lx, m.ly, m.rx, m.ry);
    }

    fn pressed(&mut self, button: LogicalButton) {
        tracing::info!("{} pressed", button.label());
    }
}

pub struct JoystickPoller<D> {
    device: D,
    config: JoystickConfig,
    prev_buttons: u32,
}

impl<D: JoystickDevice> JoystickPoller<D> {
    pub fn new(device: D, config: JoystickConfig) -> Self {
        Self {
            device,
            config,
            prev_buttons: 0,
        }
    }

    /// One cycle. A read error is logged and the cycle skipped, leaving the
    /// previous button state untouched.
    pub fn poll_once(&mut self, sink: &mut dyn JoystickSink) {
        let state = match self.device.read() {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!("error reading joystick: {err:#}");
                return;
            }
        };
        sink.stick(stick_message(&state, &self.config.axes));
        for button in pressed_edges(self.prev_buttons, state.buttons, &self.config.buttons) {
            sink.pressed(button);
        }
        self.prev_buttons = state.buttons;
    }

    pub fn run(&mut self, sink: &mut dyn JoystickSink, stop: &StopFlag) {
        while !stop.is_set() {
            self.poll_once(sink);
            thread::sleep(POLL_PERIOD);
        }
    }
}
