use std::fs;

use cli::{Interaction, ObjectPrompt, run_with};
use test_support::{DEFAULT_PASSWORD, DEFAULT_USER, FakeHost, HostEvent, sample_save_file};
use zipseries_core::{ConfigError, LibraryName, ObjectSpec, Role, Secret, SecretPrompt};

struct Answers;

impl SecretPrompt for Answers {
    fn password(&mut self, _role: Role, _server: &str, _user: &str) -> Result<Secret, ConfigError> {
        Ok(Secret::from(DEFAULT_PASSWORD))
    }
}

impl ObjectPrompt for Answers {
    fn objects(
        &mut self,
        _library: Option<&LibraryName>,
    ) -> Result<Option<Vec<ObjectSpec>>, ConfigError> {
        Ok(None)
    }
}

fn invoke(arguments: &[&str]) -> (i32, String, String) {
    let mut secrets = Answers;
    let mut objects = Answers;
    let mut interaction = Interaction {
        secrets: &mut secrets,
        objects: &mut objects,
        styled: false,
    };
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = run_with(
        std::iter::once("zipseries").chain(arguments.iter().copied()),
        &mut stdout,
        &mut stderr,
        &mut interaction,
    );
    (
        code,
        String::from_utf8(stdout).expect("utf-8"),
        String::from_utf8(stderr).expect("utf-8"),
    )
}

#[test]
fn save_only_writes_the_local_file_and_skips_the_target() {
    let payload = sample_save_file(3000);
    let host = FakeHost::builder().save_payload(payload.clone()).start();
    let dir = tempfile::tempdir().expect("tempdir");
    let local = dir.path().join("payroll.savf");
    let local_arg = local.to_string_lossy().into_owned();
    let address = host.host();
    let port = host.port().to_string();

    let (code, stdout, stderr) = invoke(&[
        "-s",
        address.as_str(),
        "-u",
        DEFAULT_USER,
        "-l",
        "PAYROLL",
        "--source-save-file",
        local_arg.as_str(),
        "--port",
        port.as_str(),
    ]);

    assert_eq!(code, 0, "{stderr}");
    assert_eq!(fs::read(&local).expect("saved file"), payload);
    assert!(stdout.contains("save file kept at"), "{stdout}");
    assert_eq!(host.sessions(), 1);
    assert!(
        !host
            .events()
            .iter()
            .any(|event| matches!(event, HostEvent::Restored { .. }))
    );
}

#[test]
fn restore_only_uploads_the_local_file() {
    let payload = sample_save_file(2048);
    let host = FakeHost::start();
    let dir = tempfile::tempdir().expect("tempdir");
    let local = dir.path().join("payroll.savf");
    fs::write(&local, &payload).expect("write save file");
    let local_arg = local.to_string_lossy().into_owned();
    let address = host.host();
    let port = host.port().to_string();

    let (code, _, stderr) = invoke(&[
        "--target-save-file",
        local_arg.as_str(),
        "-S",
        address.as_str(),
        "-U",
        DEFAULT_USER,
        "-L",
        "PAYROLL2",
        "--port",
        port.as_str(),
    ]);

    assert_eq!(code, 0, "{stderr}");
    assert_eq!(host.sessions(), 1);
    assert!(host.events().iter().any(|event| matches!(
        event,
        HostEvent::Restored { bytes, .. } if *bytes == payload
    )));
}

#[test]
fn restore_only_from_a_missing_file_is_a_configuration_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent.savf");
    let missing = missing.to_string_lossy().into_owned();

    let (code, _, stderr) = invoke(&[
        "--target-save-file",
        missing.as_str(),
        "-S",
        "target.invalid",
        "-U",
        DEFAULT_USER,
        "-L",
        "PAYROLL2",
    ]);

    assert_eq!(code, 1);
    assert!(stderr.contains("does not exist"), "{stderr}");
}
