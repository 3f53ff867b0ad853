//! Keyboard and joystick input.

mod event;
pub mod joystick;
mod keyboard;
mod spawn;

pub use event::InputEvent;
pub use keyboard::{map_key, Flow, KeyDispatcher, KEY_PCT};
pub use spawn::run_input_reader;
