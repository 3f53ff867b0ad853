/// Visual odometry block of a telemetry snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MvoData {
    /// cm/s
    pub velocity_x: i16,
    pub velocity_y: i16,
    pub velocity_z: i16,
    pub position_x: f32,
    pub position_y: f32,
    pub position_z: f32,
}

/// Inertial block of a telemetry snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImuData {
    pub quaternion_w: f32,
    pub quaternion_x: f32,
    pub quaternion_y: f32,
    pub quaternion_z: f32,
    /// Degrees Celsius.
    pub temperature: i16,
    /// Degrees, derived by the drone from the quaternion.
    pub yaw: i16,
}

/// One telemetry snapshot as reported by the drone.
///
/// Values are raw drone units; turning them into display text is the job of
/// [`crate::telemetry::derive_field_values`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightData {
    /// Decimeters above the takeoff point.
    pub height: i16,
    pub battery_percentage: u8,
    pub battery_milli_volts: i16,
    pub battery_low: bool,
    pub battery_critical: bool,
    pub battery_state: bool,
    pub low_battery_threshold: u8,
    /// Meters.
    pub max_height: u8,
    pub wifi_strength: u8,
    pub wifi_interference: u8,
    pub north_speed: i16,
    pub east_speed: i16,
    pub ground_speed: i16,
    pub vertical_speed: i16,
    pub down_visual_state: bool,
    pub over_temp: bool,
    pub light_strength: u8,
    pub on_ground: bool,
    pub drone_hover: bool,
    pub flying: bool,
    pub fly_mode: u8,
    pub camera_state: u8,
    pub drone_fly_time_left: i16,
    pub mvo: MvoData,
    pub imu: ImuData,
    pub ssid: String,
    pub version: String,
}

/// Quaternion (w, x, y, z) for the given Euler angles in degrees.
pub(crate) fn quaternion_from_euler_deg(roll: f32, pitch: f32, yaw: f32) -> (f32, f32, f32, f32) {
    let (sr, cr) = (roll.to_radians() * 0.5).sin_cos();
    let (sp, cp) = (pitch.to_radians() * 0.5).sin_cos();
    let (sy, cy) = (yaw.to_radians() * 0.5).sin_cos();
    (
        cr * cp * cy + sr * sp * sy,
        sr * cp * cy - cr * sp * sy,
        cr * sp * cy + sr * cp * sy,
        cr * cp * sy - sr * sp * cy,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_attitude_is_identity_quaternion() {
        let (w, x, y, z) = quaternion_from_euler_deg(0.0, 0.0, 0.0);
        assert!((w - 1.0).abs() < 1e-6);
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6 && z.abs() < 1e-6);
    }

    #[test]
    fn pure_yaw_only_rotates_about_z() {
        let (w, x, y, z) = quaternion_from_euler_deg(0.0, 0.0, 90.0);
        let half = std::f32::consts::FRAC_1_SQRT_2;
        assert!((w - half).abs() < 1e-6);
        assert!((z - half).abs() < 1e-6);
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
    }
}
