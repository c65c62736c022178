#![cfg(feature = "cli")]

use std::process::{Command, Output};

fn dv4link(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dv4link"))
        .args(["--log-level", "error"])
        .args(args)
        .env_remove("DV4LINK_PORT")
        .env_remove("DV4LINK_BAUD")
        .output()
        .expect("dv4link should run")
}

#[test]
fn encode_pretty_prints_wire_bytes() {
    let output = dv4link(&["--format", "pretty", "encode", "2", "--hex", "01"]);

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "71 FE 39 1D 02 01 01"
    );
}

#[test]
fn encode_empty_payload_by_name() {
    let output = dv4link(&["--format", "pretty", "encode", "flush-tx"]);

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "71 FE 39 1D 03 00"
    );
}

#[test]
fn encode_json_describes_the_frame() {
    let output = dv4link(&["--format", "json", "encode", "write-tx", "--data", "hi"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"command\":4"));
    assert!(stdout.contains("\"command_name\":\"WRITE_TX\""));
    assert!(stdout.contains("\"payload_size\":2"));
    assert!(stdout.contains("\"wire\":\"71 FE 39 1D 04 02 68 69\""));
}

#[test]
fn encode_raw_writes_binary() {
    let output = dv4link(&["--format", "raw", "encode", "5"]);

    assert!(output.status.success());
    assert_eq!(output.stdout, vec![0x71u8, 0xFE, 0x39, 0x1D, 0x05, 0x00]);
}

#[test]
fn encode_rejects_oversized_payload() {
    let payload = "a".repeat(256);
    let output = dv4link(&["encode", "4", "--data", &payload]);

    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("encode failed"));
}

#[test]
fn encode_rejects_bad_hex() {
    let output = dv4link(&["encode", "4", "--hex", "abc"]);

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_prints_package_version() {
    let output = dv4link(&["version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("dv4link {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn version_extended_lists_build_details() {
    let output = dv4link(&["version", "--extended"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: dv4link"));
    assert!(stdout.contains("preamble: 71 FE 39 1D"));
    assert!(stdout.contains("cli=true"));
}

#[test]
fn send_without_commands_is_a_usage_error() {
    let output = dv4link(&["send", "/dev/dv4link-does-not-exist"]);

    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("nothing to send"));
}

#[test]
fn send_to_missing_port_fails_cleanly() {
    let output = dv4link(&["send", "/dev/dv4link-does-not-exist", "--flush"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("open failed"));
}

#[test]
fn listen_requires_a_port() {
    let output = dv4link(&["listen"]);

    assert_eq!(output.status.code(), Some(2));
}
