//! Control-mapping help printed by `--keyhelp` and `--joyhelp`.

/// Keyboard binding definition.
pub struct Binding {
    pub keys: &'static str,
    pub action: &'static str,
}

pub const KEY_BINDINGS: &[Binding] = &[
    Binding {
        keys: "<Cursor Keys>",
        action: "Move Left/Right/Forward/Backward",
    },
    Binding {
        keys: "w|a|s|d",
        action: "W: Up, S: Down, A: Turn Left, D: Turn Right",
    },
    Binding {
        keys: "<SPACE>",
        action: "Hover (stop all movement)",
    },
    Binding {
        keys: "<HOME>",
        action: "Set Home position or fly to Home position",
    },
    Binding {
        keys: "b",
        action: "Bounce (toggle)",
    },
    Binding {
        keys: "t",
        action: "Takeoff",
    },
    Binding {
        keys: "o",
        action: "Throw Takeoff",
    },
    Binding {
        keys: "l",
        action: "Land",
    },
    Binding {
        keys: "p",
        action: "Palm Land",
    },
    Binding {
        keys: "0",
        action: "360 degree smart video flight",
    },
    Binding {
        keys: "1|2|3|4",
        action: "Flip Fwd/Back/Left/Right",
    },
    Binding {
        keys: "f",
        action: "Take Picture (Foto)",
    },
    Binding {
        keys: "q/<Escape>",
        action: "Quit",
    },
    Binding {
        keys: "r/<Ctrl-L>",
        action: "Refresh Screen",
    },
    Binding {
        keys: "v",
        action: "Start Video (player) Window",
    },
    Binding {
        keys: "-",
        action: "Slow (normal) flight mode",
    },
    Binding {
        keys: "+",
        action: "Fast (sports) flight mode",
    },
    Binding {
        keys: "=",
        action: "Switch between normal and wide video mode",
    },
];

pub const JOYSTICK_BINDINGS: &[Binding] = &[
    Binding {
        keys: "Right Stick",
        action: "Forward/Backward/Left/Right",
    },
    Binding {
        keys: "Left Stick",
        action: "Up/Down/Turn",
    },
    Binding {
        keys: "Triangle",
        action: "Takeoff",
    },
    Binding {
        keys: "X",
        action: "Land",
    },
    Binding {
        keys: "Circle",
        action: "",
    },
    Binding {
        keys: "Square",
        action: "Take Photo",
    },
    Binding {
        keys: "L1",
        action: "Bounce (on/off)",
    },
    Binding {
        keys: "L2",
        action: "Palm Land",
    },
];

const KEY_COLUMN: usize = 14;

pub fn format_help(title: &str, bindings: &[Binding]) -> String {
    let mut out = format!("{title}\n\n");
    for binding in bindings {
        let line = format!("{:<KEY_COLUMN$}{}", binding.keys, binding.action);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn key_help() -> String {
    format_help("TelloTerm Keyboard Control Mapping", KEY_BINDINGS)
}

pub fn joystick_help() -> String {
    format_help("TelloTerm Joystick Control Mapping", JOYSTICK_BINDINGS)
}
