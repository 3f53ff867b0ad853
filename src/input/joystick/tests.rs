use super::*;
use crate::config::JoystickType;
use crate::drone::command_channel;
use anyhow::anyhow;
use crossbeam_channel::bounded;
use std::collections::VecDeque;

/// Replays a scripted sequence of reads.
struct Scripted(VecDeque<Result<RawState>>);

impl JoystickDevice for Scripted {
    fn read(&mut self) -> Result<RawState> {
        self.0.pop_front().unwrap_or_else(|| Ok(RawState::default()))
    }
}

#[derive(Default)]
struct Recorder {
    sticks: Vec<StickMessage>,
    pressed: Vec<LogicalButton>,
}

impl JoystickSink for Recorder {
    fn stick(&mut self, message: StickMessage) {
        self.sticks.push(message);
    }

    fn pressed(&mut self, button: LogicalButton) {
        self.pressed.push(button);
    }
}

fn buttons(mask: u32) -> Result<RawState> {
    Ok(RawState {
        axes: vec![0; 8],
        buttons: mask,
    })
}

#[test]
fn dead_zone_zeroes_small_deflection() {
    assert_eq!(apply_dead_zone(0), 0);
    assert_eq!(apply_dead_zone(1999), 0);
    assert_eq!(apply_dead_zone(-1999), 0);
    assert_eq!(apply_dead_zone(2000), 2000);
    assert_eq!(apply_dead_zone(-2000), -2000);
    assert_eq!(apply_dead_zone(i16::MIN), i16::MIN);
}

#[test]
fn stick_message_selects_and_inverts_axes() {
    let state = RawState {
        axes: vec![5000, 6000, 0, 1500, -7000, 0, 0, 0],
        buttons: 0,
    };
    let message = stick_message(&state, &DUALSHOCK4.axes);
    assert_eq!(
        message,
        StickMessage {
            lx: 5000,
            ly: -6000,
            rx: 0,
            ry: 7000,
        }
    );
}

#[test]
fn inverting_most_negative_axis_saturates() {
    let state = RawState {
        axes: vec![0, i16::MIN, 0, 0, 0],
        buttons: 0,
    };
    assert_eq!(stick_message(&state, &DUALSHOCK4.axes).ly, i16::MAX);
}

#[test]
fn missing_axes_read_as_centered() {
    let state = RawState {
        axes: vec![9000, 0],
        buttons: 0,
    };
    let message = stick_message(&state, &DUALSHOCK4.axes);
    assert_eq!(
        message,
        StickMessage {
            lx: 9000,
            ..StickMessage::default()
        }
    );
}

#[test]
fn edges_fire_once_per_press() {
    let x = 1 << DUALSHOCK4.buttons.x.expect("bound");
    let mut poller = JoystickPoller::new(
        Scripted(
            [0, x, x, 0, x]
                .into_iter()
                .map(buttons)
                .collect::<VecDeque<_>>(),
        ),
        DUALSHOCK4,
    );
    let mut sink = Recorder::default();
    for _ in 0..5 {
        poller.poll_once(&mut sink);
    }
    assert_eq!(sink.pressed, vec![LogicalButton::X, LogicalButton::X]);
    assert_eq!(sink.sticks.len(), 5);
}

#[test]
fn read_error_skips_cycle_and_keeps_previous_buttons() {
    let x = 1 << DUALSHOCK4.buttons.x.expect("bound");
    let script = VecDeque::from([buttons(x), Err(anyhow!("device hiccup")), buttons(x)]);
    let mut poller = JoystickPoller::new(Scripted(script), DUALSHOCK4);
    let mut sink = Recorder::default();
    for _ in 0..3 {
        poller.poll_once(&mut sink);
    }
    assert_eq!(sink.pressed, vec![LogicalButton::X]);
    assert_eq!(sink.sticks.len(), 2);
}

#[test]
fn unbound_buttons_never_fire() {
    assert!(pressed_edges(0, u32::MAX, &ButtonMap::default()).is_empty());
    let fired = pressed_edges(0, u32::MAX, &DUALSHOCK4.buttons);
    assert!(!fired.contains(&LogicalButton::L3));
    assert!(!fired.contains(&LogicalButton::R3));
}

#[test]
fn all_buttons_are_scanned_before_state_is_replaced() {
    let b = &HOTAS_X.buttons;
    let mask = [b.l1, b.triangle, b.x]
        .into_iter()
        .flatten()
        .fold(0u32, |m, i| m | 1 << i);
    assert_eq!(
        pressed_edges(0, mask, b),
        vec![LogicalButton::L1, LogicalButton::Triangle, LogicalButton::X]
    );
}

#[test]
fn bound_buttons_map_to_commands() {
    assert_eq!(LogicalButton::L1.command(), Some(DroneCommand::Bounce));
    assert_eq!(LogicalButton::L2.command(), Some(DroneCommand::PalmLand));
    assert_eq!(LogicalButton::Square.command(), Some(DroneCommand::TakePicture));
    assert_eq!(LogicalButton::Triangle.command(), Some(DroneCommand::TakeOff));
    assert_eq!(LogicalButton::X.command(), Some(DroneCommand::Land));
    assert_eq!(LogicalButton::Circle.command(), None);
}

#[test]
fn drone_sink_sends_sticks_and_commands() {
    let (stick_tx, stick_rx) = bounded(1);
    let (commands, command_rx) = command_channel();
    let mut sink = DroneSink::new(stick_tx, commands);
    let message = StickMessage {
        lx: 3000,
        ..StickMessage::default()
    };
    sink.stick(message);
    // channel full: dropped after one period instead of blocking forever
    sink.stick(message);
    sink.pressed(LogicalButton::Triangle);
    sink.pressed(LogicalButton::Circle);
    assert_eq!(stick_rx.try_recv(), Ok(message));
    assert!(stick_rx.try_recv().is_err());
    assert_eq!(command_rx.try_recv(), Ok(DroneCommand::TakeOff));
    assert!(command_rx.try_recv().is_err());
}

#[test]
fn yaml_mapping_parses_with_unbound_buttons() {
    let config = JoystickConfig::from_yaml(
        "axes: {left_x: 0, left_y: 1, right_x: 2, right_y: 3}\nbuttons: {x: 0, triangle: 3}\n",
    )
    .expect("mapping");
    assert_eq!(config.axes.right_y, 3);
    assert_eq!(config.buttons.triangle, Some(3));
    assert_eq!(config.buttons.square, None);
}

#[test]
fn yaml_mapping_rejects_bad_input() {
    assert!(JoystickConfig::from_yaml("axes: {left_x: 0}\nbuttons: {}\n").is_err());
    assert!(JoystickConfig::from_yaml(
        "axes: {left_x: 0, left_y: 1, right_x: 2, right_y: 3}\nbuttons: {x: 40}\n"
    )
    .is_err());
}

#[test]
fn builtin_types_resolve_without_mapping_file() {
    assert_eq!(
        JoystickConfig::for_type(JoystickType::HotasX, None).expect("hotas"),
        HOTAS_X
    );
    assert_eq!(
        JoystickConfig::for_type(JoystickType::DualShock4, None).expect("ds4"),
        DUALSHOCK4
    );
    assert!(JoystickConfig::for_type(JoystickType::Custom, None).is_err());
}

/// Forwards to the `--jstest` sink while counting what reaches it.
#[derive(Default)]
struct CountingDiagnostics {
    inner: DiagnosticSink,
    sticks: usize,
    pressed: Vec<LogicalButton>,
}

impl JoystickSink for CountingDiagnostics {
    fn stick(&mut self, message: StickMessage) {
        self.sticks += 1;
        self.inner.stick(message);
    }

    fn pressed(&mut self, button: LogicalButton) {
        self.pressed.push(button);
        self.inner.pressed(button);
    }
}

#[test]
fn diagnostic_mode_reports_edges_without_commanding() {
    let x = 1 << DUALSHOCK4.buttons.x.expect("bound");
    let circle = 1 << DUALSHOCK4.buttons.circle.expect("bound");
    let script = [0, x, x, 0, x | circle]
        .into_iter()
        .map(buttons)
        .collect::<VecDeque<_>>();
    let mut poller = JoystickPoller::new(Scripted(script), DUALSHOCK4);
    let mut sink = CountingDiagnostics::default();
    for _ in 0..5 {
        poller.poll_once(&mut sink);
    }
    assert_eq!(sink.sticks, 5);
    assert_eq!(
        sink.pressed,
        vec![LogicalButton::X, LogicalButton::Circle, LogicalButton::X]
    );
}
