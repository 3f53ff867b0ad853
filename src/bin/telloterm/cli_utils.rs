use anyhow::Result;
use std::io::{self, Write};
use telloterm::input::joystick::{
    list_joysticks, DiagnosticSink, GilrsJoystick, JoystickConfig, JoystickPoller,
};
use telloterm::tasks::StopFlag;
use telloterm::AppConfig;

pub(crate) fn print_joysticks() -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    list_joysticks(&mut out)?;
    out.flush()?;
    Ok(())
}

/// Log joystick state and button presses until the process is interrupted.
pub(crate) fn run_joystick_test(config: &AppConfig) -> Result<()> {
    let (Some(jsid), Some(kind)) = (config.jsid, config.jstype) else {
        return Ok(());
    };
    let mapping = JoystickConfig::for_type(kind, config.jsmap.as_deref())?;
    let device = GilrsJoystick::open(jsid)?;
    tracing::info!("testing joystick {jsid} ({}) as {}", device.name(), kind.label());
    let mut poller = JoystickPoller::new(device, mapping);
    poller.run(&mut DiagnosticSink, &StopFlag::new());
    Ok(())
}
