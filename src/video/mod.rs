//! Relay of the drone's raw video stream into an external player's stdin.

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::io::Write;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::drone::{CommandSender, DroneCommand, DroneLink};
use crate::tasks::{StopFlag, TaskSet};

/// The drone stops streaming unless start-video is repeated at this cadence.
pub const REASSERT_INTERVAL: Duration = Duration::from_millis(500);
const STOP_POLL: Duration = Duration::from_millis(50);
const CHUNK_POLL: Duration = Duration::from_millis(100);

/// Single-shot video relay: the first `start` wires everything up, later
/// calls are ignored.
#[derive(Debug, Default)]
pub struct VideoRelay {
    started: AtomicBool,
}

impl VideoRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Subscribe to video, launch the player and start the keep-alive and copy
    /// loops. Returns `false` when the relay was already running.
    pub fn start(
        &self,
        tasks: &mut TaskSet,
        drone: &Arc<dyn DroneLink>,
        config: &AppConfig,
    ) -> Result<bool> {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::info!("video already started; ignoring request");
            return Ok(false);
        }
        let chunks = drone
            .subscribe_video()
            .context("failed to subscribe to video stream")?;
        let (mut player, stdin) = spawn_player(config)?;

        let commands = drone.commands();
        tasks.spawn("video-keepalive", move |stop| {
            run_keepalive(&commands, REASSERT_INTERVAL, &stop);
            Ok(())
        })?;

        tasks.spawn("video-copy", move |stop| {
            let result = run_copy(&chunks, stdin, &stop);
            if let Err(err) = player.kill() {
                tracing::debug!("video player already exited: {err}");
            }
            match player.wait() {
                Ok(status) => tracing::info!("video player exited: {status}"),
                Err(err) => tracing::warn!("failed to reap video player: {err}"),
            }
            result
        })?;
        tracing::info!("video relay started");
        Ok(true)
    }
}

fn spawn_player(config: &AppConfig) -> Result<(Child, ChildStdin)> {
    let (program, args) = config.player_command()?;
    let mut child = Command::new(&program)
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to start video player {program}"))?;
    let stdin = child
        .stdin
        .take()
        .with_context(|| format!("video player {program} has no stdin pipe"))?;
    tracing::info!("video player started: {program} {}", args.join(" "));
    Ok((child, stdin))
}

/// Fixed-interval schedule that skips ticks missed during a stall instead of
/// bursting to catch up.
#[derive(Debug)]
struct Cadence {
    interval: Duration,
    next: Instant,
}

impl Cadence {
    fn starting_at(start: Instant, interval: Duration) -> Self {
        Self {
            interval,
            next: start,
        }
    }

    fn due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next = now + self.interval;
        true
    }

    fn remaining(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }
}

/// Issue start-video now and then every `interval` until stopped.
pub fn run_keepalive(commands: &CommandSender, interval: Duration, stop: &StopFlag) {
    let mut cadence = Cadence::starting_at(Instant::now(), interval);
    while !stop.is_set() {
        let now = Instant::now();
        if cadence.due(now) {
            commands.send(DroneCommand::StartVideo);
            continue;
        }
        thread::sleep(cadence.remaining(now).min(STOP_POLL));
    }
}

/// Write each chunk verbatim to `sink`. A write failure ends the relay with an error.
pub fn run_copy(chunks: &Receiver<Vec<u8>>, mut sink: impl Write, stop: &StopFlag) -> Result<()> {
    let mut bytes = 0u64;
    while !stop.is_set() {
        let chunk = match chunks.recv_timeout(CHUNK_POLL) {
            Ok(chunk) => chunk,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                tracing::info!("video stream closed");
                break;
            }
        };
        sink.write_all(&chunk)
            .and_then(|()| sink.flush())
            .context("failed to write video to player")?;
        bytes += chunk.len() as u64;
    }
    tracing::debug!("video relay copied {bytes} bytes");
    Ok(())
}
