use crossterm::style::Color;

use super::{CellStyle, FieldKey, Label};

/// Where and how one field is drawn, plus the text shown before any telemetry arrives.
pub(super) struct FieldLayout {
    pub(super) key: FieldKey,
    pub(super) label: &'static str,
    pub(super) label_x: u16,
    pub(super) label_y: u16,
    pub(super) label_fg: Color,
    pub(super) x: u16,
    pub(super) y: u16,
    pub(super) width: usize,
    pub(super) placeholder: &'static str,
}

const fn row(
    key: FieldKey,
    label: &'static str,
    (label_x, label_y): (u16, u16),
    label_fg: Color,
    (x, y): (u16, u16),
    width: usize,
    placeholder: &'static str,
) -> FieldLayout {
    FieldLayout {
        key,
        label,
        label_x,
        label_y,
        label_fg,
        x,
        y,
        width,
        placeholder,
    }
}

const W: Color = Color::White;
const Y: Color = Color::Yellow;

/// 80x24 dashboard, one row per `FieldKey` in declaration order.
pub(super) const LAYOUT: [FieldLayout; FieldKey::COUNT] = [
    row(FieldKey::Height, "Height:", (8, 2), W, (16, 2), 5, "?m"),
    row(FieldKey::Battery, "Battery:", (34, 2), W, (43, 2), 4, "?%"),
    row(FieldKey::WifiStrength, "WiFi:", (61, 2), W, (67, 2), 4, "?%"),
    row(FieldKey::MaxHeight, "Max Height:", (4, 3), W, (16, 3), 5, "?m"),
    row(FieldKey::VoltageMv, "Voltage:", (34, 3), W, (43, 3), 6, "?"),
    row(FieldKey::WifiInterference, "Interference:", (53, 3), W, (67, 3), 4, "?%"),
    row(FieldKey::LowBatteryThreshold, "Lo Batt Threshold:", (24, 4), W, (43, 4), 4, "?%"),
    row(FieldKey::DerivedSpeed, "Derived Speed:", (28, 6), Y, (43, 6), 7, "?m/s"),
    row(FieldKey::VerticalSpeed, "Vertical Speed:", (51, 6), W, (67, 6), 7, "?m/s"),
    row(FieldKey::GroundSpeed, "Ground Speed:", (2, 7), W, (16, 7), 5, "?m/s"),
    row(FieldKey::ForwardSpeed, "Forward Speed:", (28, 7), W, (43, 7), 5, "?m/s"),
    row(FieldKey::LateralSpeed, "Lateral Speed:", (52, 7), W, (67, 7), 5, "?m/s"),
    row(FieldKey::BatteryLow, "Battery Low:", (3, 9), W, (16, 9), 5, "?"),
    row(FieldKey::BatteryCritical, "Battery Critical:", (25, 9), W, (43, 9), 5, "?"),
    row(FieldKey::BatteryState, "Battery State:", (52, 9), W, (67, 9), 5, "?"),
    row(FieldKey::GroundVisual, "Ground Visual:", (1, 10), W, (16, 10), 5, "?"),
    row(FieldKey::OverTemp, "Over Temperature:", (25, 10), W, (43, 10), 5, "?"),
    row(FieldKey::LightStrength, "Light Strength:", (51, 10), W, (67, 10), 5, "?"),
    row(FieldKey::OnGround, "On Ground:", (5, 11), W, (16, 11), 5, "?"),
    row(FieldKey::Hovering, "Hovering:", (33, 11), W, (43, 11), 5, "?"),
    row(FieldKey::Flying, "Flying:", (59, 11), W, (67, 11), 5, "?"),
    row(FieldKey::CameraState, "Camera State:", (2, 12), W, (16, 12), 6, "?"),
    row(FieldKey::FlightMode, "Flight Mode:", (30, 12), W, (43, 12), 5, "?"),
    row(FieldKey::FlightTimeLeft, "Flight Remaining:", (49, 12), W, (67, 12), 6, "?"),
    row(FieldKey::VelocityX, "X Velocity:", (4, 15), W, (16, 15), 8, "?"),
    row(FieldKey::VelocityY, "Y Velocity:", (31, 15), W, (43, 15), 8, "?"),
    row(FieldKey::VelocityZ, "Z Velocity:", (55, 15), W, (67, 15), 8, "?"),
    row(FieldKey::PositionX, "X Position:", (4, 16), W, (16, 16), 6, "?"),
    row(FieldKey::PositionY, "Y Position:", (31, 16), W, (43, 16), 6, "?"),
    row(FieldKey::PositionZ, "Z Position:", (55, 16), W, (67, 16), 6, "?"),
    row(FieldKey::QuaternionX, "X Quat:", (8, 18), W, (16, 18), 6, "?"),
    row(FieldKey::QuaternionY, "Y Quat:", (35, 18), W, (43, 18), 6, "?"),
    row(FieldKey::QuaternionZ, "Z Quat:", (59, 18), W, (67, 18), 6, "?"),
    row(FieldKey::Temperature, "Temp:", (10, 19), W, (16, 19), 6, "?"),
    row(FieldKey::QuaternionW, "W Quat:", (35, 19), W, (43, 19), 6, "?"),
    row(FieldKey::Yaw, "Yaw:", (62, 19), Y, (67, 19), 6, "?°"),
    row(FieldKey::HomePosition, "Home Pos:", (33, 20), Y, (43, 20), 5, "?"),
    row(FieldKey::Ssid, "SSID:", (10, 22), W, (16, 22), 20, "?"),
    row(FieldKey::Firmware, "Firmware:", (57, 22), W, (67, 22), 10, "?"),
];

/// Chrome drawn once and on every manual redraw.
pub fn static_labels() -> [Label; 3] {
    [
        Label {
            text: "TelloTerm",
            x: 33,
            y: 0,
            style: CellStyle::plain(W).reversed(),
        },
        Label {
            text: "MVO Data",
            x: 33,
            y: 14,
            style: CellStyle::plain(W).bold(),
        },
        Label {
            text: "IMU Data",
            x: 33,
            y: 17,
            style: CellStyle::plain(W).bold(),
        },
    ]
}
