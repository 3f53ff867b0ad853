//! In-process drone used by `--sim` and by the session tests.
//!
//! Commands and sticks drive a small kinematic model; a telemetry snapshot is
//! published every tick. Video only flows while start-video keeps being
//! re-asserted, like the real aircraft.

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::rc::RcAxes;
use super::{
    command_channel, quaternion_from_euler_deg, Broadcast, CommandSender, DroneCommand, DroneLink,
    FlightData, FlipDirection, ImuData, MvoData, StickMessage,
};
use crate::lock::lock_or_recover;

const TICK: Duration = Duration::from_millis(50);
const VIDEO_KEEPALIVE: Duration = Duration::from_secs(2);
const TELEMETRY_CAPACITY: usize = 8;
const VIDEO_CAPACITY: usize = 64;
const STICK_CAPACITY: usize = 4;
const TAKEOFF_HEIGHT_DM: f32 = 8.0;
const MAX_HORIZONTAL_MPS: f32 = 2.0;
const MAX_VERTICAL_MPS: f32 = 1.0;
const MAX_YAW_DPS: f32 = 90.0;
const HOME_ARRIVAL_M: f32 = 0.1;
const BATTERY_DRAIN_PER_SEC: f32 = 0.05;
const PICTURE_WIDTH: usize = 32;
const PICTURE_HEIGHT: usize = 24;

#[derive(Debug)]
pub(crate) struct SimState {
    flying: bool,
    height_dm: f32,
    x: f32,
    y: f32,
    yaw_deg: f32,
    north_speed: f32,
    east_speed: f32,
    vertical_speed: f32,
    battery: f32,
    fast_mode: bool,
    bouncing: bool,
    wide_video: bool,
    keys: RcAxes,
    stick: StickMessage,
    home: Option<(f32, f32)>,
    flying_home: bool,
    video_until: Option<Instant>,
    video_frame: u32,
    pictures: Vec<Vec<u8>>,
    low_battery_threshold: Option<u8>,
    max_height: Option<u8>,
    ssid: Option<String>,
    version: Option<String>,
}

impl SimState {
    pub(crate) fn new() -> Self {
        Self {
            flying: false,
            height_dm: 0.0,
            x: 0.0,
            y: 0.0,
            yaw_deg: 0.0,
            north_speed: 0.0,
            east_speed: 0.0,
            vertical_speed: 0.0,
            battery: 100.0,
            fast_mode: false,
            bouncing: false,
            wide_video: false,
            keys: RcAxes::default(),
            stick: StickMessage::default(),
            home: None,
            flying_home: false,
            video_until: None,
            video_frame: 0,
            pictures: Vec::new(),
            low_battery_threshold: None,
            max_height: None,
            ssid: None,
            version: None,
        }
    }

    pub(crate) fn apply(&mut self, command: DroneCommand, now: Instant) {
        if self.keys.apply_key(command) {
            if command == DroneCommand::Hover {
                self.flying_home = false;
            }
            return;
        }
        match command {
            DroneCommand::TakeOff | DroneCommand::ThrowTakeOff => {
                if !self.flying {
                    self.flying = true;
                    self.height_dm = TAKEOFF_HEIGHT_DM;
                }
            }
            DroneCommand::Land | DroneCommand::PalmLand => {
                self.flying = false;
                self.flying_home = false;
                self.height_dm = 0.0;
                self.keys = RcAxes::default();
            }
            DroneCommand::Bounce => self.bouncing = !self.bouncing,
            DroneCommand::Flip(direction) => {
                let name = match direction {
                    FlipDirection::Forward => "forward",
                    FlipDirection::Back => "back",
                    FlipDirection::Left => "left",
                    FlipDirection::Right => "right",
                };
                tracing::info!("sim: flip {name}");
            }
            DroneCommand::SmartVideo360 => {
                if self.flying {
                    self.yaw_deg = wrap_degrees(self.yaw_deg + 360.0);
                }
            }
            DroneCommand::TakePicture => {
                let picture = synthetic_picture(self.pictures.len() as u8);
                self.pictures.push(picture);
            }
            DroneCommand::StartVideo => self.video_until = Some(now + VIDEO_KEEPALIVE),
            DroneCommand::FastMode => self.fast_mode = true,
            DroneCommand::SlowMode => self.fast_mode = false,
            DroneCommand::VideoWide => self.wide_video = true,
            DroneCommand::VideoNormal => self.wide_video = false,
            DroneCommand::SetHome => self.home = Some((self.x, self.y)),
            DroneCommand::FlyHome => self.flying_home = self.home.is_some() && self.flying,
            DroneCommand::QueryLowBatteryThreshold => self.low_battery_threshold = Some(25),
            DroneCommand::QueryMaxHeight => self.max_height = Some(10),
            DroneCommand::QuerySsid => self.ssid = Some("TELLO-SIM000".to_string()),
            DroneCommand::QueryVersion => self.version = Some("01.04.92.01".to_string()),
            _ => {}
        }
    }

    pub(crate) fn set_stick(&mut self, stick: StickMessage) {
        self.stick = stick;
    }

    pub(crate) fn step(&mut self, dt: f32) {
        self.battery = (self.battery - BATTERY_DRAIN_PER_SEC * dt).max(0.0);
        if !self.flying {
            self.north_speed = 0.0;
            self.east_speed = 0.0;
            self.vertical_speed = 0.0;
            return;
        }

        let speed_scale = if self.fast_mode { 2.0 } else { 1.0 };
        let axes = RcAxes::from_stick(self.stick).or(self.keys);
        self.yaw_deg = wrap_degrees(self.yaw_deg + axes.yaw / 100.0 * MAX_YAW_DPS * dt);

        let (north, east) = if self.flying_home {
            self.home_velocity(speed_scale)
        } else {
            let forward = axes.pitch / 100.0 * MAX_HORIZONTAL_MPS * speed_scale;
            let lateral = axes.roll / 100.0 * MAX_HORIZONTAL_MPS * speed_scale;
            let (sin, cos) = self.yaw_deg.to_radians().sin_cos();
            (forward * cos - lateral * sin, forward * sin + lateral * cos)
        };
        self.north_speed = north;
        self.east_speed = east;
        self.x += north * dt;
        self.y += east * dt;

        self.vertical_speed = axes.throttle / 100.0 * MAX_VERTICAL_MPS;
        let ceiling_dm = f32::from(self.max_height.unwrap_or(10)) * 10.0;
        self.height_dm = (self.height_dm + self.vertical_speed * 10.0 * dt).clamp(0.0, ceiling_dm);
    }

    fn home_velocity(&mut self, speed_scale: f32) -> (f32, f32) {
        let Some((hx, hy)) = self.home else {
            self.flying_home = false;
            return (0.0, 0.0);
        };
        let (dx, dy) = (hx - self.x, hy - self.y);
        let distance = (dx * dx + dy * dy).sqrt();
        if distance < HOME_ARRIVAL_M {
            self.flying_home = false;
            return (0.0, 0.0);
        }
        let speed = MAX_HORIZONTAL_MPS * speed_scale;
        (dx / distance * speed, dy / distance * speed)
    }

    /// Next synthetic video chunk, if the stream is still being asserted.
    pub(crate) fn video_chunk(&mut self, now: Instant) -> Option<Vec<u8>> {
        match self.video_until {
            Some(until) if now <= until => {
                self.video_frame = self.video_frame.wrapping_add(1);
                let mut chunk = vec![0, 0, 0, 1, if self.wide_video { 0x66 } else { 0x65 }];
                chunk.extend_from_slice(&self.video_frame.to_be_bytes());
                Some(chunk)
            }
            _ => None,
        }
    }

    pub(crate) fn snapshot(&self) -> FlightData {
        let (w, x, y, z) = quaternion_from_euler_deg(0.0, 0.0, self.yaw_deg);
        let hovering = self.flying
            && self.north_speed == 0.0
            && self.east_speed == 0.0
            && self.vertical_speed == 0.0;
        let battery = self.battery.round() as u8;
        let low_threshold = self.low_battery_threshold.unwrap_or(0);
        FlightData {
            height: self.height_dm.round() as i16,
            battery_percentage: battery,
            battery_milli_volts: 3500 + (self.battery * 8.0) as i16,
            battery_low: battery < low_threshold,
            battery_critical: battery < 10,
            battery_state: false,
            low_battery_threshold: low_threshold,
            max_height: self.max_height.unwrap_or(0),
            wifi_strength: 90,
            wifi_interference: 0,
            north_speed: self.north_speed.round() as i16,
            east_speed: self.east_speed.round() as i16,
            ground_speed: self.north_speed.hypot(self.east_speed).round() as i16,
            vertical_speed: self.vertical_speed.round() as i16,
            down_visual_state: self.flying,
            over_temp: false,
            light_strength: 0,
            on_ground: !self.flying,
            drone_hover: hovering,
            flying: self.flying,
            fly_mode: if self.flying { 6 } else { 1 },
            camera_state: 0,
            drone_fly_time_left: (self.battery * 4.0) as i16,
            mvo: MvoData {
                velocity_x: (self.north_speed * 100.0) as i16,
                velocity_y: (self.east_speed * 100.0) as i16,
                velocity_z: (self.vertical_speed * 100.0) as i16,
                position_x: self.x,
                position_y: self.y,
                position_z: -self.height_dm / 10.0,
            },
            imu: ImuData {
                quaternion_w: w,
                quaternion_x: x,
                quaternion_y: y,
                quaternion_z: z,
                temperature: 40,
                yaw: self.yaw_deg.round() as i16,
            },
            ssid: self.ssid.clone().unwrap_or_default(),
            version: self.version.clone().unwrap_or_default(),
        }
    }
}

fn wrap_degrees(deg: f32) -> f32 {
    let wrapped = (deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// Binary PGM gradient, stamped with the picture index.
fn synthetic_picture(index: u8) -> Vec<u8> {
    let mut image = format!("P5\n{PICTURE_WIDTH} {PICTURE_HEIGHT}\n255\n").into_bytes();
    for row in 0..PICTURE_HEIGHT {
        for col in 0..PICTURE_WIDTH {
            let shade = (row * 255 / PICTURE_HEIGHT + col * 4) as u8;
            image.push(shade.wrapping_add(index.wrapping_mul(16)));
        }
    }
    image
}

struct Shared {
    state: Mutex<SimState>,
    telemetry: Broadcast<FlightData>,
    video: Broadcast<Vec<u8>>,
}

pub struct SimDrone {
    commands: CommandSender,
    stick_tx: Sender<StickMessage>,
    shared: Arc<Shared>,
    stop: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SimDrone {
    pub fn start() -> Self {
        let (commands, command_rx) = command_channel();
        let (stick_tx, stick_rx) = bounded(STICK_CAPACITY);
        let shared = Arc::new(Shared {
            state: Mutex::new(SimState::new()),
            telemetry: Broadcast::new(TELEMETRY_CAPACITY),
            video: Broadcast::new(VIDEO_CAPACITY),
        });
        let stop = Arc::new(AtomicBool::new(false));
        let worker = spawn_sim_thread(shared.clone(), command_rx, stick_rx, stop.clone());
        Self {
            commands,
            stick_tx,
            shared,
            stop,
            worker: Mutex::new(Some(worker)),
        }
    }
}

fn spawn_sim_thread(
    shared: Arc<Shared>,
    command_rx: Receiver<DroneCommand>,
    stick_rx: Receiver<StickMessage>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut last = Instant::now();
        while !stop.load(Ordering::Relaxed) {
            thread::sleep(TICK);
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f32();
            last = now;

            let (snapshot, chunk) = {
                let mut state = lock_or_recover(&shared.state, "sim tick");
                for command in command_rx.try_iter() {
                    tracing::debug!("sim: {}", command.label());
                    state.apply(command, now);
                }
                if let Some(stick) = stick_rx.try_iter().last() {
                    state.set_stick(stick);
                }
                state.step(dt);
                (state.snapshot(), state.video_chunk(now))
            };
            shared.telemetry.publish(&snapshot);
            if let Some(chunk) = chunk {
                shared.video.publish(&chunk);
            }
        }
    })
}

impl DroneLink for SimDrone {
    fn commands(&self) -> CommandSender {
        self.commands.clone()
    }

    fn subscribe_telemetry(&self) -> Result<Receiver<FlightData>> {
        Ok(self.shared.telemetry.subscribe())
    }

    fn subscribe_video(&self) -> Result<Receiver<Vec<u8>>> {
        Ok(self.shared.video.subscribe())
    }

    fn stick_sender(&self) -> Result<Sender<StickMessage>> {
        Ok(self.stick_tx.clone())
    }

    fn picture_count(&self) -> usize {
        lock_or_recover(&self.shared.state, "sim picture_count").pictures.len()
    }

    fn save_all_pictures(&self, prefix: &str) -> Result<usize> {
        let state = lock_or_recover(&self.shared.state, "sim save_all_pictures");
        for (index, picture) in state.pictures.iter().enumerate() {
            let path = format!("{prefix}_{}.pgm", index + 1);
            fs::write(&path, picture).with_context(|| format!("failed to write {path}"))?;
        }
        Ok(state.pictures.len())
    }

    fn is_home_set(&self) -> bool {
        lock_or_recover(&self.shared.state, "sim is_home_set").home.is_some()
    }

    fn disconnect(&self) {
        self.stop.store(true, Ordering::Relaxed);
        let handle = lock_or_recover(&self.worker, "sim disconnect").take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

impl Drop for SimDrone {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn takeoff_and_land_toggle_flying() {
        let now = Instant::now();
        let mut state = SimState::new();
        assert!(state.snapshot().on_ground);
        state.apply(DroneCommand::TakeOff, now);
        let snapshot = state.snapshot();
        assert!(snapshot.flying);
        assert_eq!(snapshot.height, 8);
        state.apply(DroneCommand::Land, now);
        let snapshot = state.snapshot();
        assert!(!snapshot.flying);
        assert_eq!(snapshot.height, 0);
    }

    #[test]
    fn forward_key_moves_north_until_hover() {
        let now = Instant::now();
        let mut state = SimState::new();
        state.apply(DroneCommand::TakeOff, now);
        state.apply(DroneCommand::Forward(50), now);
        state.step(1.0);
        assert!(state.snapshot().mvo.position_x > 0.9);
        state.apply(DroneCommand::Hover, now);
        state.step(1.0);
        assert!(state.snapshot().drone_hover);
    }

    #[test]
    fn stick_overrides_keys_per_axis() {
        let now = Instant::now();
        let mut state = SimState::new();
        state.apply(DroneCommand::TakeOff, now);
        state.apply(DroneCommand::Up(50), now);
        state.set_stick(StickMessage {
            ly: -i16::MAX,
            ..StickMessage::default()
        });
        state.step(0.5);
        assert!(state.snapshot().height < 8);
    }

    #[test]
    fn fly_home_returns_to_home_point() {
        let now = Instant::now();
        let mut state = SimState::new();
        state.apply(DroneCommand::TakeOff, now);
        state.apply(DroneCommand::SetHome, now);
        state.apply(DroneCommand::Right(100), now);
        state.step(1.0);
        state.apply(DroneCommand::Hover, now);
        state.apply(DroneCommand::FlyHome, now);
        for _ in 0..40 {
            state.step(0.05);
        }
        let snapshot = state.snapshot();
        assert!(snapshot.mvo.position_y.abs() < 0.2);
    }

    #[test]
    fn video_stops_without_reassertion() {
        let now = Instant::now();
        let mut state = SimState::new();
        assert!(state.video_chunk(now).is_none());
        state.apply(DroneCommand::StartVideo, now);
        assert!(state.video_chunk(now + Duration::from_millis(500)).is_some());
        assert!(state.video_chunk(now + VIDEO_KEEPALIVE * 2).is_none());
        state.apply(DroneCommand::StartVideo, now + VIDEO_KEEPALIVE * 2);
        assert!(state.video_chunk(now + VIDEO_KEEPALIVE * 2).is_some());
    }

    #[test]
    fn extended_info_appears_after_queries() {
        let now = Instant::now();
        let mut state = SimState::new();
        assert!(state.snapshot().ssid.is_empty());
        state.apply(DroneCommand::QuerySsid, now);
        state.apply(DroneCommand::QueryVersion, now);
        state.apply(DroneCommand::QueryMaxHeight, now);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.ssid, "TELLO-SIM000");
        assert_eq!(snapshot.version, "01.04.92.01");
        assert_eq!(snapshot.max_height, 10);
    }

    #[test]
    fn wrap_degrees_stays_in_range() {
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
    }

    #[test]
    fn sim_drone_publishes_telemetry_and_saves_pictures() {
        let drone = SimDrone::start();
        let telemetry = drone.subscribe_telemetry().expect("telemetry");
        drone.commands().send(DroneCommand::TakeOff);
        drone.commands().send(DroneCommand::TakePicture);
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut flying = false;
        while Instant::now() < deadline {
            if let Ok(snapshot) = telemetry.recv_timeout(Duration::from_millis(200)) {
                if snapshot.flying {
                    flying = true;
                    break;
                }
            }
        }
        assert!(flying, "simulator never reported flight");
        assert_eq!(drone.picture_count(), 1);

        let prefix = env::temp_dir().join(format!("telloterm-sim-{}", std::process::id()));
        let prefix = prefix.to_str().expect("utf8 temp path").to_string();
        assert_eq!(drone.save_all_pictures(&prefix).expect("save"), 1);
        let path = format!("{prefix}_1.pgm");
        let bytes = fs::read(&path).expect("picture written");
        assert!(bytes.starts_with(b"P5\n"));
        let _ = fs::remove_file(path);
        drone.disconnect();
    }
}
