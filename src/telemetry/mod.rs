//! Telemetry ingestion: turn each `FlightData` snapshot into display text and
//! apply it to the registry as one batch.

mod flight_log;

use anyhow::Result;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use crate::drone::FlightData;
use crate::fields::{FieldKey, FieldRegistry};
use crate::tasks::StopFlag;

pub use flight_log::FlightLog;

const RECV_POLL: Duration = Duration::from_millis(100);

fn yes_no(flag: bool) -> String {
    if flag { "Y" } else { "N" }.to_string()
}

/// Display text for every data field, in `FieldKey` order.
pub fn derive_field_values(data: &FlightData, home_set: bool) -> Vec<(FieldKey, String)> {
    let derived_speed = f64::from(data.north_speed).hypot(f64::from(data.east_speed));
    vec![
        (FieldKey::Height, format!("{:.1}m", f32::from(data.height) / 10.0)),
        (FieldKey::Battery, format!("{}%", data.battery_percentage)),
        (FieldKey::WifiStrength, format!("{}%", data.wifi_strength)),
        (FieldKey::MaxHeight, format!("{}m", data.max_height)),
        (FieldKey::VoltageMv, format!("{}mV", data.battery_milli_volts)),
        (FieldKey::WifiInterference, format!("{}%", data.wifi_interference)),
        (
            FieldKey::LowBatteryThreshold,
            format!("{}%", data.low_battery_threshold),
        ),
        (FieldKey::DerivedSpeed, format!("{derived_speed:.1}m/s")),
        (FieldKey::VerticalSpeed, format!("{}m/s", data.vertical_speed)),
        (FieldKey::GroundSpeed, format!("{}m/s", data.ground_speed)),
        (FieldKey::ForwardSpeed, format!("{}m/s", data.north_speed)),
        (FieldKey::LateralSpeed, format!("{}m/s", data.east_speed)),
        (FieldKey::BatteryLow, yes_no(data.battery_low)),
        (FieldKey::BatteryCritical, yes_no(data.battery_critical)),
        (FieldKey::BatteryState, yes_no(data.battery_state)),
        (FieldKey::GroundVisual, yes_no(data.down_visual_state)),
        (FieldKey::OverTemp, yes_no(data.over_temp)),
        (FieldKey::LightStrength, data.light_strength.to_string()),
        (FieldKey::OnGround, yes_no(data.on_ground)),
        (FieldKey::Hovering, yes_no(data.drone_hover)),
        (FieldKey::Flying, yes_no(data.flying)),
        (FieldKey::CameraState, data.camera_state.to_string()),
        (FieldKey::FlightMode, data.fly_mode.to_string()),
        (FieldKey::FlightTimeLeft, data.drone_fly_time_left.to_string()),
        (FieldKey::VelocityX, format!("{}cm/s", data.mvo.velocity_x)),
        (FieldKey::VelocityY, format!("{}cm/s", data.mvo.velocity_y)),
        (FieldKey::VelocityZ, format!("{}cm/s", data.mvo.velocity_z)),
        (FieldKey::PositionX, format!("{:.6}", data.mvo.position_x)),
        (FieldKey::PositionY, format!("{:.6}", data.mvo.position_y)),
        (FieldKey::PositionZ, format!("{:.6}", data.mvo.position_z)),
        (FieldKey::QuaternionX, format!("{:.6}", data.imu.quaternion_x)),
        (FieldKey::QuaternionY, format!("{:.6}", data.imu.quaternion_y)),
        (FieldKey::QuaternionZ, format!("{:.6}", data.imu.quaternion_z)),
        (FieldKey::Temperature, format!("{}C", data.imu.temperature)),
        (FieldKey::QuaternionW, format!("{:.6}", data.imu.quaternion_w)),
        (FieldKey::Yaw, format!("{}°", data.imu.yaw)),
        (
            FieldKey::HomePosition,
            if home_set { "Set" } else { "Unset" }.to_string(),
        ),
        (FieldKey::Ssid, data.ssid.clone()),
        (FieldKey::Firmware, data.version.clone()),
    ]
}

/// Consume snapshots until stopped or the stream closes. A flight-log write
/// failure ends the loop with an error.
pub fn run_ingestion(
    snapshots: Receiver<FlightData>,
    registry: Arc<FieldRegistry>,
    home_set: impl Fn() -> bool,
    mut flight_log: Option<FlightLog>,
    stop: StopFlag,
) -> Result<()> {
    let mut received = 0u64;
    while !stop.is_set() {
        let data = match snapshots.recv_timeout(RECV_POLL) {
            Ok(data) => data,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                tracing::info!("telemetry stream closed after {received} snapshots");
                break;
            }
        };
        received += 1;
        registry.update(derive_field_values(&data, home_set()));
        if let Some(log) = flight_log.as_mut() {
            log.append(&data)?;
        }
    }
    Ok(())
}
