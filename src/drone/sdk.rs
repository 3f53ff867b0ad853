//! Real drone over the Tello text SDK.
//!
//! Commands go to UDP 8889, state arrives as `key:value;` records on 8890 and the
//! raw H.264 stream on 11111. Sockets use read timeouts so every thread notices
//! the stop flag within one poll.

use anyhow::{bail, Context, Result};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::rc::RcAxes;
use super::{
    command_channel, quaternion_from_euler_deg, Broadcast, CommandSender, DroneCommand, DroneLink,
    FlightData, FlipDirection, StickMessage,
};
use crate::lock::lock_or_recover;

const COMMAND_PORT: u16 = 8889;
const STATE_PORT: u16 = 8890;
const VIDEO_PORT: u16 = 11111;
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(3);
const SOCKET_POLL: Duration = Duration::from_millis(100);
const KEEPALIVE: Duration = Duration::from_secs(5);
const STICK_CAPACITY: usize = 4;
const TELEMETRY_CAPACITY: usize = 8;
const VIDEO_CAPACITY: usize = 256;
const VIDEO_DATAGRAM: usize = 2048;
const STATE_DATAGRAM: usize = 1024;

/// What the SDK can do with a dashboard command.
#[derive(Debug, PartialEq, Eq)]
enum SdkAction {
    /// Movement: fold into the rc state and resend it.
    Rc,
    Send(&'static str),
    Unsupported,
}

fn sdk_action(command: DroneCommand) -> SdkAction {
    match command {
        DroneCommand::Forward(_)
        | DroneCommand::Backward(_)
        | DroneCommand::Left(_)
        | DroneCommand::Right(_)
        | DroneCommand::Up(_)
        | DroneCommand::Down(_)
        | DroneCommand::TurnLeft(_)
        | DroneCommand::TurnRight(_)
        | DroneCommand::Hover => SdkAction::Rc,
        DroneCommand::TakeOff => SdkAction::Send("takeoff"),
        DroneCommand::Land => SdkAction::Send("land"),
        DroneCommand::Flip(FlipDirection::Forward) => SdkAction::Send("flip f"),
        DroneCommand::Flip(FlipDirection::Back) => SdkAction::Send("flip b"),
        DroneCommand::Flip(FlipDirection::Left) => SdkAction::Send("flip l"),
        DroneCommand::Flip(FlipDirection::Right) => SdkAction::Send("flip r"),
        DroneCommand::StartVideo => SdkAction::Send("streamon"),
        DroneCommand::FastMode => SdkAction::Send("speed 100"),
        DroneCommand::SlowMode => SdkAction::Send("speed 50"),
        DroneCommand::QueryVersion => SdkAction::Send("sdk?"),
        _ => SdkAction::Unsupported,
    }
}

fn rc_line(axes: RcAxes) -> String {
    let [a, b, c, d] = axes.as_percentages();
    format!("rc {a} {b} {c} {d}")
}

/// Parse one state datagram. Unknown keys and malformed values are skipped.
fn parse_state(record: &str) -> FlightData {
    let mut data = FlightData::default();
    let (mut pitch, mut roll, mut yaw) = (0.0f32, 0.0f32, 0.0f32);
    let (mut temp_low, mut temp_high) = (None, None);
    for pair in record.trim().split(';') {
        let Some((key, value)) = pair.split_once(':') else {
            continue;
        };
        let int = || value.trim().parse::<i32>().ok();
        match key.trim() {
            "pitch" => pitch = int().unwrap_or(0) as f32,
            "roll" => roll = int().unwrap_or(0) as f32,
            "yaw" => yaw = int().unwrap_or(0) as f32,
            "vgx" => data.north_speed = clamp_i16(int()),
            "vgy" => data.east_speed = clamp_i16(int()),
            "vgz" => data.vertical_speed = clamp_i16(int()),
            "templ" => temp_low = int(),
            "temph" => temp_high = int(),
            // centimeters
            "h" => data.height = clamp_i16(int().map(|cm| cm / 10)),
            "bat" => data.battery_percentage = int().unwrap_or(0).clamp(0, 100) as u8,
            "time" => data.drone_fly_time_left = clamp_i16(int()),
            "x" => data.mvo.position_x = int().unwrap_or(0) as f32 / 100.0,
            "y" => data.mvo.position_y = int().unwrap_or(0) as f32 / 100.0,
            "z" => data.mvo.position_z = int().unwrap_or(0) as f32 / 100.0,
            _ => {}
        }
    }
    data.ground_speed = clamp_i16(Some(
        f32::from(data.north_speed)
            .hypot(f32::from(data.east_speed))
            .round() as i32,
    ));
    data.mvo.velocity_x = data.north_speed.saturating_mul(10);
    data.mvo.velocity_y = data.east_speed.saturating_mul(10);
    data.mvo.velocity_z = data.vertical_speed.saturating_mul(10);
    data.imu.temperature = match (temp_low, temp_high) {
        (Some(low), Some(high)) => clamp_i16(Some((low + high) / 2)),
        (Some(t), None) | (None, Some(t)) => clamp_i16(Some(t)),
        (None, None) => 0,
    };
    data.imu.yaw = yaw as i16;
    let (w, x, y, z) = quaternion_from_euler_deg(roll, pitch, yaw);
    data.imu.quaternion_w = w;
    data.imu.quaternion_x = x;
    data.imu.quaternion_y = y;
    data.imu.quaternion_z = z;
    data.flying = data.height > 0;
    data.on_ground = !data.flying;
    data.drone_hover =
        data.flying && data.north_speed == 0 && data.east_speed == 0 && data.vertical_speed == 0;
    data
}

fn clamp_i16(value: Option<i32>) -> i16 {
    value
        .unwrap_or(0)
        .clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

fn bind_listener(port: u16) -> Result<UdpSocket> {
    let socket = UdpSocket::bind(("0.0.0.0", port))
        .with_context(|| format!("failed to bind UDP port {port}"))?;
    socket
        .set_read_timeout(Some(SOCKET_POLL))
        .context("failed to set socket read timeout")?;
    Ok(socket)
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}

struct Shared {
    telemetry: Broadcast<FlightData>,
    video: Broadcast<Vec<u8>>,
    version: Mutex<Option<String>>,
    awaiting_version: AtomicBool,
}

pub struct SdkDrone {
    commands: CommandSender,
    stick_tx: Sender<StickMessage>,
    shared: Arc<Shared>,
    stop: Arc<AtomicBool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl SdkDrone {
    /// Enter SDK mode and start the command, reply, state and video threads.
    pub fn connect(addr: IpAddr) -> Result<Self> {
        let drone = SocketAddr::new(addr, COMMAND_PORT);
        let socket = UdpSocket::bind(("0.0.0.0", 0)).context("failed to bind command socket")?;
        socket
            .connect(drone)
            .with_context(|| format!("failed to reach drone at {drone}"))?;
        socket
            .set_read_timeout(Some(HANDSHAKE_TIMEOUT))
            .context("failed to set socket read timeout")?;
        socket
            .send(b"command")
            .with_context(|| format!("failed to send to drone at {drone}"))?;
        let mut buf = [0u8; 64];
        let len = socket
            .recv(&mut buf)
            .with_context(|| format!("no answer from drone at {drone}"))?;
        let reply = String::from_utf8_lossy(&buf[..len]);
        if reply.trim() != "ok" {
            bail!("drone at {drone} refused SDK mode: {}", reply.trim());
        }
        socket
            .set_read_timeout(Some(SOCKET_POLL))
            .context("failed to set socket read timeout")?;
        tracing::info!("connected to drone at {drone}");

        let state_socket = bind_listener(STATE_PORT)?;
        let video_socket = bind_listener(VIDEO_PORT)?;
        let reply_socket = socket.try_clone().context("failed to clone command socket")?;

        let (commands, command_rx) = command_channel();
        let (stick_tx, stick_rx) = bounded(STICK_CAPACITY);
        let shared = Arc::new(Shared {
            telemetry: Broadcast::new(TELEMETRY_CAPACITY),
            video: Broadcast::new(VIDEO_CAPACITY),
            version: Mutex::new(None),
            awaiting_version: AtomicBool::new(false),
        });
        let stop = Arc::new(AtomicBool::new(false));

        let workers = vec![
            spawn_command_thread(socket, command_rx, stick_rx, shared.clone(), stop.clone()),
            spawn_reply_thread(reply_socket, shared.clone(), stop.clone()),
            spawn_state_thread(state_socket, shared.clone(), stop.clone()),
            spawn_video_thread(video_socket, shared.clone(), stop.clone()),
        ];

        Ok(Self {
            commands,
            stick_tx,
            shared,
            stop,
            workers: Mutex::new(workers),
        })
    }
}

fn send_text(socket: &UdpSocket, text: &str) {
    tracing::debug!("sdk > {text}");
    if let Err(err) = socket.send(text.as_bytes()) {
        tracing::warn!("sdk send {text:?} failed: {err}");
    }
}

fn spawn_command_thread(
    socket: UdpSocket,
    command_rx: Receiver<DroneCommand>,
    stick_rx: Receiver<StickMessage>,
    shared: Arc<Shared>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut keys = RcAxes::default();
        let mut stick = RcAxes::default();
        let mut last_rc = RcAxes::default();
        let mut last_sent = Instant::now();
        while !stop.load(Ordering::Relaxed) {
            select! {
                recv(command_rx) -> msg => {
                    let Ok(command) = msg else { break };
                    match sdk_action(command) {
                        SdkAction::Rc => {
                            keys.apply_key(command);
                        }
                        SdkAction::Send(text) => {
                            if command == DroneCommand::QueryVersion {
                                shared.awaiting_version.store(true, Ordering::Relaxed);
                            }
                            send_text(&socket, text);
                            last_sent = Instant::now();
                        }
                        SdkAction::Unsupported => {
                            tracing::debug!(
                                "sdk has no equivalent for {}; dropped",
                                command.label()
                            );
                        }
                    }
                }
                recv(stick_rx) -> msg => {
                    if let Ok(sample) = msg {
                        stick = RcAxes::from_stick(sample);
                    }
                }
                default(SOCKET_POLL) => {}
            }

            let rc = stick.or(keys);
            if rc != last_rc {
                send_text(&socket, &rc_line(rc));
                last_rc = rc;
                last_sent = Instant::now();
            } else if last_sent.elapsed() >= KEEPALIVE {
                send_text(&socket, "command");
                last_sent = Instant::now();
            }
        }
    })
}

fn spawn_reply_thread(
    socket: UdpSocket,
    shared: Arc<Shared>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut buf = [0u8; 256];
        while !stop.load(Ordering::Relaxed) {
            let len = match socket.recv(&mut buf) {
                Ok(len) => len,
                Err(err) if is_timeout(&err) => continue,
                Err(err) => {
                    tracing::warn!("sdk reply socket: {err}");
                    continue;
                }
            };
            let reply = String::from_utf8_lossy(&buf[..len]).trim().to_string();
            tracing::debug!("sdk < {reply}");
            if reply == "ok" || reply.starts_with("error") {
                continue;
            }
            if shared.awaiting_version.swap(false, Ordering::Relaxed) {
                *lock_or_recover(&shared.version, "sdk version") = Some(reply);
            }
        }
    })
}

fn spawn_state_thread(
    socket: UdpSocket,
    shared: Arc<Shared>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut buf = [0u8; STATE_DATAGRAM];
        while !stop.load(Ordering::Relaxed) {
            let len = match socket.recv(&mut buf) {
                Ok(len) => len,
                Err(err) if is_timeout(&err) => continue,
                Err(err) => {
                    tracing::warn!("sdk state socket: {err}");
                    continue;
                }
            };
            let mut data = parse_state(&String::from_utf8_lossy(&buf[..len]));
            if let Some(version) = lock_or_recover(&shared.version, "sdk version").clone() {
                data.version = version;
            }
            shared.telemetry.publish(&data);
        }
    })
}

fn spawn_video_thread(
    socket: UdpSocket,
    shared: Arc<Shared>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut buf = vec![0u8; VIDEO_DATAGRAM];
        while !stop.load(Ordering::Relaxed) {
            match socket.recv(&mut buf) {
                Ok(len) if shared.video.has_subscribers() => {
                    shared.video.publish(&buf[..len].to_vec());
                }
                Ok(_) => {}
                Err(err) if is_timeout(&err) => {}
                Err(err) => tracing::warn!("sdk video socket: {err}"),
            }
        }
    })
}

impl DroneLink for SdkDrone {
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
        0
    }

    fn save_all_pictures(&self, _prefix: &str) -> Result<usize> {
        Ok(0)
    }

    fn is_home_set(&self) -> bool {
        false
    }

    fn disconnect(&self) {
        self.stop.store(true, Ordering::Relaxed);
        let workers = std::mem::take(&mut *lock_or_recover(&self.workers, "sdk disconnect"));
        for handle in workers {
            let _ = handle.join();
        }
    }
}

impl Drop for SdkDrone {
    fn drop(&mut self) {
        self.disconnect();
    }
}
