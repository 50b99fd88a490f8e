//! Runs the `lagrange` binary on system files.

use std::io::Write;
use std::process::{Command, Output};

use tempfile::NamedTempFile;

fn system_file(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn lagrange(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lagrange"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

const PENDULUM: &str = r#"
[system]
name = "pendulum"
coordinates = ["theta"]
parameters = ["m", "l", "g"]
kinetic = "m*l^2*dtheta^2/2"
potential = "-m*g*l*cos(theta)"
"#;

#[test]
fn derive_text() {
    let file = system_file(PENDULUM, ".toml");
    let out = lagrange(&["derive", file.path().to_str().unwrap()]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "ddtheta = -g*sin(theta)/l\n");
}

#[test]
fn derive_json_with_renames() {
    let toml = format!(
        "{PENDULUM}\n[export]\npower = \"double-star\"\n\n[export.renames]\nddtheta = \"alpha\"\n"
    );
    let file = system_file(&toml, ".toml");
    let out = lagrange(&["derive", "--format", "json", file.path().to_str().unwrap()]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let rows: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(rows[0]["coordinate"], "theta");
    assert_eq!(rows[0]["acceleration"], "alpha");
    assert_eq!(rows[0]["expression"]["text"], "-g*sin(theta)/l");
}

#[test]
fn derive_with_custom_naming() {
    let toml = r#"
[system]
coordinates = ["x"]
parameters = ["k", "c"]
kinetic = "x_dot^2/2"
potential = "k*x^2/2"
forces = ["-c*x_dot"]

[naming]
velocity = { suffix = "_dot" }
acceleration = { suffix = "_ddot" }
"#;
    let file = system_file(toml, ".toml");
    let out = lagrange(&["derive", file.path().to_str().unwrap()]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("x_ddot = "));
    assert!(stdout.contains("x_dot"));
}

#[test]
fn check_reports_ok() {
    let file = system_file(PENDULUM, ".toml");
    let out = lagrange(&["check", file.path().to_str().unwrap()]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "pendulum: ok\n");
}

#[test]
fn singular_system_fails() {
    let toml = r#"
[system]
coordinates = ["a", "b"]
parameters = ["m"]
kinetic = "m*(da + db)^2/2"
potential = "0"
"#;
    let file = system_file(toml, ".toml");
    let out = lagrange(&["derive", file.path().to_str().unwrap()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("singular"), "{stderr}");
}

#[test]
fn undeclared_symbol_fails_check() {
    let toml = PENDULUM.replace("-m*g*l*cos(theta)", "-m*g*r*cos(theta)");
    let file = system_file(&toml, ".toml");
    let out = lagrange(&["check", file.path().to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("`r`"));
}

#[test]
fn json_system_file() {
    let json = r#"{
        "system": {
            "coordinates": ["x"],
            "parameters": ["k"],
            "kinetic": "dx^2/2",
            "potential": "k*x^2/2"
        }
    }"#;
    let file = system_file(json, ".json");
    let out = lagrange(&["check", file.path().to_str().unwrap()]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
}
