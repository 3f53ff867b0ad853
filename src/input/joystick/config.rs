use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::config::JoystickType;

/// Highest raw button index a bitmask can carry.
const MAX_BUTTON_INDEX: u8 = 31;

/// Raw axis index for each logical stick axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisMap {
    pub left_x: usize,
    pub left_y: usize,
    pub right_x: usize,
    pub right_y: usize,
}

/// Raw button index for each logical button; `None` means the device lacks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ButtonMap {
    pub x: Option<u8>,
    pub circle: Option<u8>,
    pub triangle: Option<u8>,
    pub square: Option<u8>,
    pub l1: Option<u8>,
    pub l2: Option<u8>,
    pub l3: Option<u8>,
    pub r1: Option<u8>,
    pub r2: Option<u8>,
    pub r3: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoystickConfig {
    pub axes: AxisMap,
    pub buttons: ButtonMap,
}

/// gilrs normalizes every mapped controller to one gamepad layout, so the raw
/// indices below are positions in the device `AXES`/`BUTTONS` tables, not
/// kernel or winmm numbers, and hold on every host.
const STANDARD_STICKS: AxisMap = AxisMap {
    left_x: 0,  // LeftStickX
    left_y: 1,  // LeftStickY
    right_x: 3, // RightStickX
    right_y: 4, // RightStickY
};

const STANDARD_BUTTONS: ButtonMap = ButtonMap {
    x: Some(0),        // South
    circle: Some(1),   // East
    triangle: Some(2), // North
    square: Some(3),   // West
    l1: Some(4),       // LeftTrigger
    l2: Some(6),       // LeftTrigger2
    l3: Some(11),      // LeftThumb
    r1: Some(5),       // RightTrigger
    r2: Some(7),       // RightTrigger2
    r3: Some(12),      // RightThumb
};

pub const DUALSHOCK4: JoystickConfig = JoystickConfig {
    axes: STANDARD_STICKS,
    buttons: ButtonMap {
        l3: None,
        r3: None,
        ..STANDARD_BUTTONS
    },
};

/// The SDL mapping gilrs applies to the T.Flight HOTAS X puts the stick on the
/// right stick, throttle on left Y and the rocker on left X; its face and
/// shoulder buttons land on the standard gamepad slots.
pub const HOTAS_X: JoystickConfig = JoystickConfig {
    axes: STANDARD_STICKS,
    buttons: STANDARD_BUTTONS,
};

impl JoystickConfig {
    /// Built-in mapping for the controller type, or the YAML mapping file for
    /// `custom`.
    pub fn for_type(kind: JoystickType, jsmap: Option<&Path>) -> Result<Self> {
        match kind {
            JoystickType::DualShock4 => Ok(DUALSHOCK4),
            JoystickType::HotasX => Ok(HOTAS_X),
            JoystickType::Custom => {
                let Some(path) = jsmap else {
                    bail!("--jstype custom requires a mapping file via --jsmap");
                };
                let text = fs::read_to_string(path)
                    .with_context(|| format!("cannot read joystick mapping {}", path.display()))?;
                Self::from_yaml(&text)
                    .with_context(|| format!("invalid joystick mapping {}", path.display()))
            }
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: JoystickConfig = serde_yaml::from_str(text)?;
        config.check_button_range()?;
        Ok(config)
    }

    fn check_button_range(&self) -> Result<()> {
        let b = &self.buttons;
        for index in [b.x, b.circle, b.triangle, b.square, b.l1, b.l2, b.l3, b.r1, b.r2, b.r3]
            .into_iter()
            .flatten()
        {
            if index > MAX_BUTTON_INDEX {
                bail!("button index {index} is out of range (0-{MAX_BUTTON_INDEX})");
            }
        }
        Ok(())
    }
}
