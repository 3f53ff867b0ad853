use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::InputEvent;
use crate::drone::{CommandSender, DroneCommand, FlipDirection};

/// Speed for arrow-key movement; w/a/s/d use twice this.
pub const KEY_PCT: u8 = 33;

/// Classify one terminal key event. Releases, repeats and unmapped keys yield `None`.
pub fn map_key(key: &KeyEvent) -> Option<InputEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('l') | KeyCode::Char('L') => Some(InputEvent::Redraw),
            _ => None,
        };
    }
    let command = |c| Some(InputEvent::Command(c));
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Some(InputEvent::Exit),
        KeyCode::Char('r') => Some(InputEvent::Redraw),
        KeyCode::Char(' ') => command(DroneCommand::Hover),
        KeyCode::Up => command(DroneCommand::Forward(KEY_PCT)),
        KeyCode::Down => command(DroneCommand::Backward(KEY_PCT)),
        KeyCode::Left => command(DroneCommand::Left(KEY_PCT)),
        KeyCode::Right => command(DroneCommand::Right(KEY_PCT)),
        KeyCode::Home => Some(InputEvent::HomeKey),
        KeyCode::Char('w') => command(DroneCommand::Up(KEY_PCT * 2)),
        KeyCode::Char('s') => command(DroneCommand::Down(KEY_PCT * 2)),
        KeyCode::Char('a') => command(DroneCommand::TurnLeft(KEY_PCT * 2)),
        KeyCode::Char('d') => command(DroneCommand::TurnRight(KEY_PCT * 2)),
        KeyCode::Char('b') => command(DroneCommand::Bounce),
        KeyCode::Char('t') => command(DroneCommand::TakeOff),
        KeyCode::Char('o') => command(DroneCommand::ThrowTakeOff),
        KeyCode::Char('l') => command(DroneCommand::Land),
        KeyCode::Char('p') => command(DroneCommand::PalmLand),
        KeyCode::Char('f') => command(DroneCommand::TakePicture),
        KeyCode::Char('0') => command(DroneCommand::SmartVideo360),
        KeyCode::Char('1') => command(DroneCommand::Flip(FlipDirection::Forward)),
        KeyCode::Char('2') => command(DroneCommand::Flip(FlipDirection::Back)),
        KeyCode::Char('3') => command(DroneCommand::Flip(FlipDirection::Left)),
        KeyCode::Char('4') => command(DroneCommand::Flip(FlipDirection::Right)),
        KeyCode::Char('+') => command(DroneCommand::FastMode),
        KeyCode::Char('-') => command(DroneCommand::SlowMode),
        KeyCode::Char('=') => Some(InputEvent::ToggleVideoMode),
        KeyCode::Char('v') => Some(InputEvent::StartVideo),
        _ => None,
    }
}

/// What the main loop must do after an event has been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Redraw,
    StartVideo,
    Quit,
}

/// Turns input events into drone commands. Holds the only state the
/// keyboard needs: whether the camera is in wide mode.
pub struct KeyDispatcher<H> {
    commands: CommandSender,
    home_set: H,
    wide_video: bool,
}

impl<H: Fn() -> bool> KeyDispatcher<H> {
    pub fn new(commands: CommandSender, home_set: H) -> Self {
        Self {
            commands,
            home_set,
            wide_video: false,
        }
    }

    pub fn dispatch(&mut self, event: InputEvent) -> Flow {
        match event {
            InputEvent::Exit => return Flow::Quit,
            InputEvent::Redraw => return Flow::Redraw,
            InputEvent::StartVideo => return Flow::StartVideo,
            InputEvent::Command(command) => self.commands.send(command),
            InputEvent::HomeKey => {
                let command = if (self.home_set)() {
                    DroneCommand::FlyHome
                } else {
                    DroneCommand::SetHome
                };
                self.commands.send(command);
            }
            InputEvent::ToggleVideoMode => {
                let command = if self.wide_video {
                    DroneCommand::VideoNormal
                } else {
                    DroneCommand::VideoWide
                };
                self.commands.send(command);
                self.wide_video = !self.wide_video;
            }
        }
        Flow::Continue
    }
}
