use crate::drone::DroneCommand;

/// A classified key press, produced by the input thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Command(DroneCommand),
    /// Fly home when a home point is set, otherwise set it.
    HomeKey,
    ToggleVideoMode,
    StartVideo,
    Redraw,
    Exit,
}
