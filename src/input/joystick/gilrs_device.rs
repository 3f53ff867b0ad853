use anyhow::{anyhow, bail, Result};
use gilrs::{Axis, Button, GamepadId, Gilrs};
use std::io::Write;

use super::{JoystickDevice, RawState};

/// Raw axis order reported to the mapping tables.
const AXES: [Axis; 8] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::LeftZ,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::RightZ,
    Axis::DPadX,
    Axis::DPadY,
];

/// Raw button order reported to the mapping tables (bit n of the mask).
const BUTTONS: [Button; 19] = [
    Button::South,
    Button::East,
    Button::North,
    Button::West,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::Mode,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::C,
    Button::Z,
];

fn init_gilrs() -> Result<Gilrs> {
    Gilrs::new().map_err(|err| anyhow!("failed to initialize gamepad support: {err}"))
}

/// gilrs reports up as positive; raw state uses the kernel joystick
/// convention (down positive) so the mapping layer flips Y like any device.
fn raw_axis(axis: Axis, value: f32) -> i16 {
    let scaled = (value.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
    match axis {
        Axis::LeftStickY | Axis::RightStickY | Axis::DPadY => scaled.saturating_neg(),
        _ => scaled,
    }
}

fn raw_state(value: impl Fn(Axis) -> f32, pressed: impl Fn(Button) -> bool) -> RawState {
    let axes = AXES.iter().map(|axis| raw_axis(*axis, value(*axis))).collect();
    let buttons = BUTTONS
        .iter()
        .enumerate()
        .filter(|(_, button)| pressed(**button))
        .fold(0u32, |mask, (bit, _)| mask | (1 << bit));
    RawState { axes, buttons }
}

/// Gamepad opened through gilrs. Not `Send` on every platform, so it is
/// opened on the thread that polls it.
pub struct GilrsJoystick {
    gilrs: Gilrs,
    id: GamepadId,
    name: String,
}

impl GilrsJoystick {
    pub fn open(jsid: usize) -> Result<Self> {
        let mut gilrs = init_gilrs()?;
        while gilrs.next_event().is_some() {}
        let found = gilrs
            .gamepads()
            .find(|(id, _)| usize::from(*id) == jsid)
            .map(|(id, gamepad)| (id, gamepad.name().to_string()));
        let Some((id, name)) = found else {
            bail!("Could not open specified joystick ID:{jsid}");
        };
        tracing::info!("opened joystick {jsid}: {name}");
        Ok(Self { gilrs, id, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl JoystickDevice for GilrsJoystick {
    fn read(&mut self) -> Result<RawState> {
        while self.gilrs.next_event().is_some() {}
        let Some(gamepad) = self.gilrs.connected_gamepad(self.id) else {
            bail!("joystick {} ({}) disconnected", usize::from(self.id), self.name);
        };
        Ok(raw_state(|axis| gamepad.value(axis), |button| gamepad.is_pressed(button)))
    }
}

/// Print id, name and control counts of every attached controller.
pub fn list_joysticks(out: &mut impl Write) -> Result<()> {
    let mut gilrs = init_gilrs()?;
    while gilrs.next_event().is_some() {}
    let mut found = 0;
    for (id, gamepad) in gilrs.gamepads() {
        let axes = AXES.iter().filter(|a| gamepad.axis_code(**a).is_some()).count();
        let buttons = BUTTONS.iter().filter(|b| gamepad.button_code(**b).is_some()).count();
        writeln!(
            out,
            "Joystick ID: {}: Name: {}, Axes: {axes}, Buttons: {buttons}",
            usize::from(id),
            gamepad.name()
        )?;
        found += 1;
    }
    if found == 0 {
        writeln!(out, "No joysticks detected")?;
    }
    Ok(())
}
