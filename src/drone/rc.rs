use super::{DroneCommand, StickMessage};

/// Remote-control percentages per axis, -100..=100, right/forward/up/clockwise positive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct RcAxes {
    pub(crate) roll: f32,
    pub(crate) pitch: f32,
    pub(crate) throttle: f32,
    pub(crate) yaw: f32,
}

impl RcAxes {
    /// Left stick drives yaw/throttle, right stick roll/pitch.
    pub(crate) fn from_stick(stick: StickMessage) -> Self {
        let pct = |v: i16| f32::from(v) * 100.0 / f32::from(i16::MAX);
        Self {
            roll: pct(stick.rx),
            pitch: pct(stick.ry),
            throttle: pct(stick.ly),
            yaw: pct(stick.lx),
        }
    }

    /// Axis-wise: a deflected stick wins over the key-driven value.
    pub(crate) fn or(self, fallback: RcAxes) -> Self {
        let pick = |a: f32, b: f32| if a != 0.0 { a } else { b };
        Self {
            roll: pick(self.roll, fallback.roll),
            pitch: pick(self.pitch, fallback.pitch),
            throttle: pick(self.throttle, fallback.throttle),
            yaw: pick(self.yaw, fallback.yaw),
        }
    }

    /// Fold a movement command into the held key state. Returns false for
    /// commands that are not movement.
    pub(crate) fn apply_key(&mut self, command: DroneCommand) -> bool {
        match command {
            DroneCommand::Forward(pct) => self.pitch = f32::from(pct),
            DroneCommand::Backward(pct) => self.pitch = -f32::from(pct),
            DroneCommand::Left(pct) => self.roll = -f32::from(pct),
            DroneCommand::Right(pct) => self.roll = f32::from(pct),
            DroneCommand::Up(pct) => self.throttle = f32::from(pct),
            DroneCommand::Down(pct) => self.throttle = -f32::from(pct),
            DroneCommand::TurnLeft(pct) => self.yaw = -f32::from(pct),
            DroneCommand::TurnRight(pct) => self.yaw = f32::from(pct),
            DroneCommand::Hover => *self = RcAxes::default(),
            _ => return false,
        }
        true
    }

    /// Integer percentages in SDK `rc` order: roll, pitch, throttle, yaw.
    pub(crate) fn as_percentages(self) -> [i32; 4] {
        [self.roll, self.pitch, self.throttle, self.yaw]
            .map(|v| v.round().clamp(-100.0, 100.0) as i32)
    }
}
