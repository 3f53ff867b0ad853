use std::process::Command;

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn telloterm_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_telloterm").expect("telloterm test binary not built")
}

#[test]
fn telloterm_help_lists_flags() {
    let output = Command::new(telloterm_bin())
        .arg("--help")
        .output()
        .expect("run telloterm --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    for flag in ["--fdlog", "--jsid", "--jstype", "--keyhelp", "--x11"] {
        assert!(combined.contains(flag), "missing {flag}");
    }
}

#[test]
fn telloterm_keyhelp_prints_keyboard_mapping() {
    let output = Command::new(telloterm_bin())
        .arg("--keyhelp")
        .output()
        .expect("run telloterm --keyhelp");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("TelloTerm Keyboard Control Mapping"));
    assert!(stdout.contains("Take Picture (Foto)"));
}

#[test]
fn telloterm_joyhelp_prints_joystick_mapping() {
    let output = Command::new(telloterm_bin())
        .arg("--joyhelp")
        .output()
        .expect("run telloterm --joyhelp");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("TelloTerm Joystick Control Mapping"));
    assert!(stdout.contains("Palm Land"));
}

#[test]
fn telloterm_rejects_jsid_without_type() {
    let output = Command::new(telloterm_bin())
        .args(["--jsid", "0"])
        .output()
        .expect("run telloterm --jsid 0");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("No joystick type supplied"));
}
