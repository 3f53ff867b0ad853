//! Session controller: brings the dashboard up in order, runs the input loop
//! and tears everything down deterministically.


use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, SecondsFormat};
use crossbeam_channel::{bounded, select, unbounded, Receiver};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::drone::{DroneCommand, DroneLink};
use crate::fields::FieldRegistry;
use crate::input::joystick::{DroneSink, GilrsJoystick, JoystickConfig, JoystickPoller};
use crate::input::{run_input_reader, Flow, InputEvent, KeyDispatcher};
use crate::lock::lock_or_recover;
use crate::render::{self, SharedScreen};
use crate::tasks::{fatal_channel, TaskSet};
use crate::telemetry::{self, FlightLog};
use crate::video::VideoRelay;

const JOYSTICK_OPEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Extended info the drone only reports when asked.
const STARTUP_QUERIES: [DroneCommand; 4] = [
    DroneCommand::QueryLowBatteryThreshold,
    DroneCommand::QueryMaxHeight,
    DroneCommand::QuerySsid,
    DroneCommand::QueryVersion,
];

/// Where key presses come from.
pub enum InputFeed {
    /// Read the controlling terminal on a supervised thread.
    Terminal,
    /// Pre-classified events, e.g. from a test.
    Events(Receiver<InputEvent>),
}

pub struct Session<'a> {
    config: &'a AppConfig,
    screen: SharedScreen,
    picture_dir: PathBuf,
}

impl<'a> Session<'a> {
    pub fn new(config: &'a AppConfig, screen: SharedScreen) -> Self {
        Self {
            config,
            screen,
            picture_dir: PathBuf::from("."),
        }
    }

    /// Directory captured pictures are written to at shutdown.
    pub fn with_picture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.picture_dir = dir.into();
        self
    }

    /// Run until the operator quits or a background task fails.
    pub fn run<C>(self, connect: C, input: InputFeed) -> Result<()>
    where
        C: FnOnce(&AppConfig) -> Result<Arc<dyn DroneLink>>,
    {
        {
            let screen = lock_or_recover(&self.screen, "session startup");
            render::check_terminal_size(&**screen)?;
        }
        let flight_log = match self.config.fdlog.as_deref() {
            Some(path) => Some(FlightLog::create(path)?),
            None => None,
        };
        let registry = Arc::new(FieldRegistry::new());
        {
            let mut screen = lock_or_recover(&self.screen, "session startup");
            render::paint_static(&mut **screen)?;
        }

        let drone = connect(self.config).context("Could not connect to Tello")?;
        let (fatal_tx, fatal_rx) = fatal_channel();
        let mut tasks = TaskSet::new(fatal_tx);

        let result =
            self.run_with_drone(&drone, &registry, flight_log, &mut tasks, &fatal_rx, input);

        tasks.shutdown();
        drone.disconnect();
        let saved = self.save_pictures(drone.as_ref());
        match (result, saved) {
            (Err(err), Err(save_err)) => {
                tracing::error!("failed to save pictures: {save_err:#}");
                Err(err)
            }
            (result, saved) => result.and(saved),
        }
    }

    fn run_with_drone(
        &self,
        drone: &Arc<dyn DroneLink>,
        registry: &Arc<FieldRegistry>,
        flight_log: Option<FlightLog>,
        tasks: &mut TaskSet,
        fatal_rx: &Receiver<anyhow::Error>,
        input: InputFeed,
    ) -> Result<()> {
        let snapshots = drone
            .subscribe_telemetry()
            .context("failed to subscribe to telemetry")?;
        {
            let registry = registry.clone();
            let drone = drone.clone();
            tasks.spawn("telemetry", move |stop| {
                let home_set = || drone.is_home_set();
                telemetry::run_ingestion(snapshots, registry, home_set, flight_log, stop)
            })?;
        }
        {
            let screen = self.screen.clone();
            let registry = registry.clone();
            tasks.spawn("render", move |stop| render::run_render_loop(screen, registry, stop))?;
        }

        let commands = drone.commands();
        for query in STARTUP_QUERIES {
            commands.send(query);
        }

        if self.config.joystick_enabled() {
            self.start_joystick(drone, tasks)?;
        }

        let input_rx = match input {
            InputFeed::Events(rx) => rx,
            InputFeed::Terminal => {
                let (tx, rx) = unbounded();
                tasks.spawn("input", move |stop| run_input_reader(tx, stop))?;
                rx
            }
        };

        tracing::info!("session running with tasks {:?}", tasks.names());
        let video = VideoRelay::new();
        let mut dispatcher = KeyDispatcher::new(commands, || drone.is_home_set());
        loop {
            select! {
                recv(input_rx) -> event => {
                    let Ok(event) = event else {
                        tracing::info!("input closed; leaving");
                        return Ok(());
                    };
                    match dispatcher.dispatch(event) {
                        Flow::Continue => {}
                        Flow::Quit => return Ok(()),
                        Flow::Redraw => render::redraw(&self.screen, registry)?,
                        Flow::StartVideo => {
                            video.start(tasks, drone, self.config)?;
                        }
                    }
                }
                recv(fatal_rx) -> err => {
                    return Err(err.unwrap_or_else(|_| anyhow!("background task channel closed")));
                }
            }
        }
    }

    /// Open the device on its polling thread and wait for the outcome, so a bad
    /// `--jsid` fails startup instead of a background thread.
    fn start_joystick(&self, drone: &Arc<dyn DroneLink>, tasks: &mut TaskSet) -> Result<()> {
        let (Some(jsid), Some(kind)) = (self.config.jsid, self.config.jstype) else {
            return Ok(());
        };
        let mapping = JoystickConfig::for_type(kind, self.config.jsmap.as_deref())?;
        let sticks = drone.stick_sender().context("failed to open stick channel")?;
        let commands = drone.commands();
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);
        tasks.spawn("joystick", move |stop| {
            let device = match GilrsJoystick::open(jsid) {
                Ok(device) => {
                    let _ = ready_tx.send(Ok(()));
                    device
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return Ok(());
                }
            };
            let mut sink = DroneSink::new(sticks, commands);
            JoystickPoller::new(device, mapping).run(&mut sink, &stop);
            Ok(())
        })?;
        match ready_rx.recv_timeout(JOYSTICK_OPEN_TIMEOUT) {
            Ok(Ok(())) => {
                tracing::info!("joystick {jsid} ({}) active", kind.label());
                Ok(())
            }
            Ok(Err(err)) => Err(err),
            Err(_) => bail!("timed out opening joystick ID:{jsid}"),
        }
    }

    fn save_pictures(&self, drone: &dyn DroneLink) -> Result<()> {
        let count = drone.picture_count();
        if count == 0 {
            return Ok(());
        }
        let stamp = Local::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let prefix = self.picture_dir.join(format!("tello_pic_{stamp}"));
        let prefix = prefix.to_string_lossy();
        let saved = drone
            .save_all_pictures(&prefix)
            .with_context(|| format!("failed to save {count} pictures"))?;
        tracing::info!("saved {saved} pictures as {prefix}_*");
        Ok(())
    }
}

/// Full interactive dashboard on the controlling terminal.
pub fn run_terminal(config: &AppConfig, screen: SharedScreen) -> Result<()> {
    Session::new(config, screen).run(crate::drone::connect, InputFeed::Terminal)
}
