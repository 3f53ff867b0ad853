use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use crossterm::event::{self, Event};
use std::time::Duration;

use super::keyboard::map_key;
use super::InputEvent;
use crate::tasks::StopFlag;

const INPUT_POLL: Duration = Duration::from_millis(100);

/// Read terminal events and forward classified key presses until stopped or
/// the receiver goes away.
pub fn run_input_reader(tx: Sender<InputEvent>, stop: StopFlag) -> Result<()> {
    while !stop.is_set() {
        if !event::poll(INPUT_POLL).context("terminal input poll failed")? {
            continue;
        }
        let Event::Key(key) = event::read().context("terminal input read failed")? else {
            continue;
        };
        let Some(input) = map_key(&key) else {
            continue;
        };
        if tx.send(input).is_err() {
            break;
        }
    }
    Ok(())
}
