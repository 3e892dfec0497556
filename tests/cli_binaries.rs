use std::net::TcpListener;

use assert_cmd::Command;
use predicates::prelude::*;
use test_support::{DEFAULT_PASSWORD, DEFAULT_USER, FakeHost, HostEvent, sample_save_file};

fn zipseries() -> Command {
    let mut command = Command::cargo_bin("zipseries").expect("zipseries binary is built");
    command
        .env_remove("ZIPSERIES_SOURCE_PASSWORD")
        .env_remove("ZIPSERIES_TARGET_PASSWORD")
        .env_remove("ZIPSERIES_LOG")
        .env_remove("ZIPSERIES_CONFIG_DIR");
    command
}

#[test]
fn version_names_the_program() {
    zipseries()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("zipSeries "))
        .stderr(predicate::str::is_empty());
}

#[test]
fn help_lists_both_roles() {
    zipseries()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--source-svr"))
        .stdout(predicate::str::contains("--target-svr"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn unknown_flag_is_a_configuration_error() {
    zipseries()
        .arg("--definitely-not-a-flag")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--definitely-not-a-flag"));
}

#[test]
fn missing_config_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    zipseries()
        .env("ZIPSERIES_CONFIG_DIR", dir.path())
        .args(["-c", "nosuch", "-l", "PAYROLL"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read config file"));
}

#[test]
fn migrates_a_library_without_a_terminal() {
    let payload = sample_save_file(4096);
    let host = FakeHost::builder().save_payload(payload.clone()).start();
    let address = host.host();
    let port = host.port().to_string();

    zipseries()
        .env("ZIPSERIES_SOURCE_PASSWORD", DEFAULT_PASSWORD)
        .env("ZIPSERIES_TARGET_PASSWORD", DEFAULT_PASSWORD)
        .args(["-s", address.as_str(), "-u", DEFAULT_USER, "-l", "PAYROLL"])
        .args(["-S", address.as_str(), "-U", DEFAULT_USER, "-L", "PAYROLL2"])
        .args(["--port", port.as_str(), "--timeout", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("save completed (4096 bytes)"))
        .stdout(predicate::str::contains("restore completed"));

    assert!(
        host.commands()
            .iter()
            .any(|command| command.starts_with("SAVLIB LIB(PAYROLL)"))
    );
    assert!(host.events().iter().any(|event| matches!(
        event,
        HostEvent::Restored { bytes, .. } if *bytes == payload
    )));
}

#[test]
fn unreachable_host_exits_with_connection_code() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port().to_string();
    drop(listener);

    zipseries()
        .env("ZIPSERIES_SOURCE_PASSWORD", "x")
        .env("ZIPSERIES_TARGET_PASSWORD", "x")
        .args(["-s", "127.0.0.1", "-u", "U", "-l", "PAYROLL"])
        .args(["-S", "127.0.0.1", "-U", "U", "-L", "PAYROLL2"])
        .args(["--port", port.as_str(), "--contimeout", "5"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("connection error"));
}
