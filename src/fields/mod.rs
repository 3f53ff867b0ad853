//! On-screen telemetry fields and the lock-guarded registry that ingestion
//! writes and the render loop reads.

mod layout;
#[cfg(test)]
mod tests;

use crossterm::style::Color;
use std::sync::RwLock;

use crate::lock::{read_or_recover, write_or_recover};
use crate::utf8_safe::pad_to_width;

pub use layout::static_labels;

/// Every displayed datum. Iteration order is declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Height,
    Battery,
    WifiStrength,
    MaxHeight,
    VoltageMv,
    WifiInterference,
    LowBatteryThreshold,
    DerivedSpeed,
    VerticalSpeed,
    GroundSpeed,
    ForwardSpeed,
    LateralSpeed,
    BatteryLow,
    BatteryCritical,
    BatteryState,
    GroundVisual,
    OverTemp,
    LightStrength,
    OnGround,
    Hovering,
    Flying,
    CameraState,
    FlightMode,
    FlightTimeLeft,
    VelocityX,
    VelocityY,
    VelocityZ,
    PositionX,
    PositionY,
    PositionZ,
    QuaternionX,
    QuaternionY,
    QuaternionZ,
    Temperature,
    QuaternionW,
    Yaw,
    HomePosition,
    Ssid,
    Firmware,
}

impl FieldKey {
    pub const COUNT: usize = 39;

    pub const ALL: [FieldKey; FieldKey::COUNT] = [
        FieldKey::Height,
        FieldKey::Battery,
        FieldKey::WifiStrength,
        FieldKey::MaxHeight,
        FieldKey::VoltageMv,
        FieldKey::WifiInterference,
        FieldKey::LowBatteryThreshold,
        FieldKey::DerivedSpeed,
        FieldKey::VerticalSpeed,
        FieldKey::GroundSpeed,
        FieldKey::ForwardSpeed,
        FieldKey::LateralSpeed,
        FieldKey::BatteryLow,
        FieldKey::BatteryCritical,
        FieldKey::BatteryState,
        FieldKey::GroundVisual,
        FieldKey::OverTemp,
        FieldKey::LightStrength,
        FieldKey::OnGround,
        FieldKey::Hovering,
        FieldKey::Flying,
        FieldKey::CameraState,
        FieldKey::FlightMode,
        FieldKey::FlightTimeLeft,
        FieldKey::VelocityX,
        FieldKey::VelocityY,
        FieldKey::VelocityZ,
        FieldKey::PositionX,
        FieldKey::PositionY,
        FieldKey::PositionZ,
        FieldKey::QuaternionX,
        FieldKey::QuaternionY,
        FieldKey::QuaternionZ,
        FieldKey::Temperature,
        FieldKey::QuaternionW,
        FieldKey::Yaw,
        FieldKey::HomePosition,
        FieldKey::Ssid,
        FieldKey::Firmware,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Foreground/background colors plus the two attributes the dashboard uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub reverse: bool,
}

impl CellStyle {
    pub const fn plain(fg: Color) -> Self {
        Self {
            fg,
            bg: Color::Reset,
            bold: false,
            reverse: false,
        }
    }

    pub const fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub const fn reversed(self) -> Self {
        Self {
            reverse: true,
            ..self
        }
    }
}

impl Default for CellStyle {
    fn default() -> Self {
        CellStyle::plain(Color::Reset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub text: &'static str,
    pub x: u16,
    pub y: u16,
    pub style: CellStyle,
}

/// One labeled, fixed-width value on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: FieldKey,
    pub label: Label,
    pub x: u16,
    pub y: u16,
    pub width: usize,
    pub style: CellStyle,
    pub value: String,
}

impl Field {
    /// Value cut or space-padded to exactly `width` columns so a shorter value
    /// overwrites every cell of a longer one.
    pub fn padded_value(&self) -> String {
        pad_to_width(&self.value, self.width)
    }
}

/// Fixed table of every field, guarded by one read/write lock.
#[derive(Debug)]
pub struct FieldRegistry {
    fields: RwLock<Vec<Field>>,
}

impl FieldRegistry {
    /// All fields at their placeholder values.
    pub fn new() -> Self {
        let fields = layout::LAYOUT
            .iter()
            .map(|row| Field {
                key: row.key,
                label: Label {
                    text: row.label,
                    x: row.label_x,
                    y: row.label_y,
                    style: CellStyle::plain(row.label_fg),
                },
                x: row.x,
                y: row.y,
                width: row.width,
                style: CellStyle::plain(Color::White),
                value: row.placeholder.to_string(),
            })
            .collect();
        Self {
            fields: RwLock::new(fields),
        }
    }

    pub fn get(&self, key: FieldKey) -> Field {
        read_or_recover(&self.fields, "field registry get")[key.index()].clone()
    }

    pub fn set_value(&self, key: FieldKey, value: impl Into<String>) {
        let mut fields = write_or_recover(&self.fields, "field registry set_value");
        fields[key.index()].value = value.into();
    }

    /// Apply many values under one write acquisition; readers see all or none.
    pub fn update<I>(&self, batch: I)
    where
        I: IntoIterator<Item = (FieldKey, String)>,
    {
        let mut fields = write_or_recover(&self.fields, "field registry update");
        for (key, value) in batch {
            fields[key.index()].value = value;
        }
    }

    /// Visit every field in declaration order while holding the read lock.
    pub fn for_each(&self, mut f: impl FnMut(&Field)) {
        let fields = read_or_recover(&self.fields, "field registry for_each");
        fields.iter().for_each(|field| f(field));
    }

    pub fn snapshot(&self) -> Vec<Field> {
        read_or_recover(&self.fields, "field registry snapshot").clone()
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}
