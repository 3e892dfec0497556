use std::fs;

use test_support::{DEFAULT_PASSWORD, DEFAULT_USER, FakeHost, HostEvent, sample_save_file};
use zipseries_core::{LibraryName, ObjectSpec, Secret};

use super::*;

#[derive(Default)]
struct Scripted {
    passwords_asked: Vec<Role>,
    objects_asked: usize,
    objects: Option<Vec<ObjectSpec>>,
}

impl SecretPrompt for Scripted {
    fn password(&mut self, role: Role, _server: &str, _user: &str) -> Result<Secret, ConfigError> {
        self.passwords_asked.push(role);
        Ok(Secret::from(DEFAULT_PASSWORD))
    }
}

impl ObjectPrompt for Scripted {
    fn objects(
        &mut self,
        _library: Option<&LibraryName>,
    ) -> Result<Option<Vec<ObjectSpec>>, ConfigError> {
        self.objects_asked += 1;
        Ok(self.objects.clone())
    }
}

struct Run {
    code: i32,
    stdout: String,
    stderr: String,
}

fn invoke(arguments: &[&str], secrets: &mut Scripted, objects: &mut Scripted) -> Run {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut interaction = Interaction {
        secrets,
        objects,
        styled: false,
    };
    let code = run_with(
        std::iter::once("zipseries").chain(arguments.iter().copied()),
        &mut stdout,
        &mut stderr,
        &mut interaction,
    );
    Run {
        code,
        stdout: String::from_utf8(stdout).expect("utf-8"),
        stderr: String::from_utf8(stderr).expect("utf-8"),
    }
}

fn quick(arguments: &[&str]) -> Run {
    invoke(arguments, &mut Scripted::default(), &mut Scripted::default())
}

fn host_arguments(host: &FakeHost) -> Vec<String> {
    let port = host.port().to_string();
    let address = host.host();
    [
        "-s",
        address.as_str(),
        "-u",
        DEFAULT_USER,
        "-l",
        "PAYROLL",
        "-S",
        address.as_str(),
        "-U",
        DEFAULT_USER,
        "-L",
        "PAYROLL2",
        "--target-release",
        "V7R3M0",
        "--port",
        port.as_str(),
        "--timeout",
        "10",
    ]
    .iter()
    .map(|value| (*value).to_owned())
    .collect()
}

#[test]
fn version_prints_program_and_release() {
    let run = quick(&["--version"]);
    assert_eq!(run.code, 0);
    assert_eq!(run.stdout, format!("zipSeries {VERSION}\n"));
    assert!(run.stderr.is_empty());
}

#[test]
fn help_goes_to_stdout() {
    let run = quick(&["--help"]);
    assert_eq!(run.code, 0);
    assert!(run.stdout.contains("--source-svr"));
    assert!(run.stdout.contains("--target-release"));
}

#[test]
fn unknown_option_is_a_configuration_error() {
    let run = quick(&["--bogus"]);
    assert_eq!(run.code, ExitCode::Configuration.as_i32());
    assert!(run.stderr.contains("--bogus"));
}

#[test]
fn missing_server_is_reported_before_connecting() {
    let run = quick(&["-l", "PAYROLL", "-L", "PAYROLL2"]);
    assert_eq!(run.code, ExitCode::Configuration.as_i32());
    assert!(run.stderr.starts_with("zipSeries: error: configuration error:"), "{}", run.stderr);
}

#[test]
fn both_local_save_files_conflict() {
    let dir = tempfile::tempdir().expect("tempdir");
    let local = dir.path().join("x.savf");
    fs::write(&local, b"x").expect("write");
    let local = local.to_string_lossy().into_owned();
    let run = quick(&[
        "-s",
        "a",
        "-u",
        "u",
        "-l",
        "L",
        "-S",
        "b",
        "-U",
        "u",
        "-L",
        "L",
        "--source-save-file",
        local.as_str(),
        "--target-save-file",
        local.as_str(),
    ]);
    assert_eq!(run.code, ExitCode::Configuration.as_i32());
}

#[test]
fn full_migration_through_one_host() {
    let payload = sample_save_file(20_000);
    let host = FakeHost::builder().save_payload(payload.clone()).start();
    let arguments = host_arguments(&host);
    let arguments: Vec<&str> = arguments.iter().map(String::as_str).collect();
    let mut secrets = Scripted::default();
    let mut objects = Scripted::default();

    let run = invoke(&arguments, &mut secrets, &mut objects);

    assert_eq!(run.code, 0, "{}", run.stderr);
    assert_eq!(secrets.passwords_asked, [Role::Source, Role::Target]);
    assert_eq!(objects.objects_asked, 1);
    assert!(run.stdout.contains("save completed (20000 bytes)"), "{}", run.stdout);
    assert!(run.stdout.contains("restore completed"));
    assert_eq!(host.sessions(), 2);
    assert!(host.events().iter().any(|event| matches!(
        event,
        HostEvent::Restored { bytes, .. } if *bytes == payload
    )));
}

#[test]
fn prompted_objects_select_savobj() {
    let host = FakeHost::start();
    let arguments = host_arguments(&host);
    let arguments: Vec<&str> = arguments.iter().map(String::as_str).collect();
    let mut objects = Scripted {
        objects: parse_object_list("EMPMAST").expect("parse"),
        ..Scripted::default()
    };

    let run = invoke(&arguments, &mut Scripted::default(), &mut objects);

    assert_eq!(run.code, 0, "{}", run.stderr);
    assert!(host.commands().iter().any(|command| command.starts_with("SAVOBJ OBJ(EMPMAST)")));
}

#[test]
fn config_file_fills_missing_options() {
    let payload = sample_save_file(512);
    let host = FakeHost::builder().save_payload(payload).start();
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("source.conf");
    fs::write(
        &source,
        format!(
            "server = {}\nuser = {DEFAULT_USER}\npassword = {DEFAULT_PASSWORD}\nlib = PAYROLL\nobj = EMPMAST\n",
            host.host()
        ),
    )
    .expect("write config");
    let source = source.to_string_lossy().into_owned();
    let port = host.port().to_string();
    let address = host.host();
    let mut secrets = Scripted::default();
    let mut objects = Scripted::default();

    let run = invoke(
        &[
            "-c",
            source.as_str(),
            "-S",
            address.as_str(),
            "-U",
            DEFAULT_USER,
            "-L",
            "PAYROLL2",
            "--port",
            port.as_str(),
            "--timeout",
            "10",
        ],
        &mut secrets,
        &mut objects,
    );

    assert_eq!(run.code, 0, "{}", run.stderr);
    assert_eq!(secrets.passwords_asked, [Role::Target]);
    assert_eq!(objects.objects_asked, 0);
    assert!(host.commands().iter().any(|command| command.starts_with("SAVOBJ OBJ(EMPMAST) LIB(PAYROLL)")));
}

#[test]
fn failing_restore_reports_partial_failure() {
    let host = FakeHost::builder()
        .save_payload(sample_save_file(256))
        .fail_command("RSTLIB", &["CPF3773: 0 objects restored."])
        .start();
    let arguments = host_arguments(&host);
    let arguments: Vec<&str> = arguments.iter().map(String::as_str).collect();

    let run = invoke(&arguments, &mut Scripted::default(), &mut Scripted::default());

    assert_eq!(run.code, ExitCode::PartialFailure.as_i32());
    assert!(run.stderr.contains("zipSeries: save completed"), "{}", run.stderr);
    assert!(run.stderr.contains("    CPF3773: 0 objects restored."));
    let kept = run
        .stderr
        .lines()
        .find_map(|line| line.strip_prefix("zipSeries: save file kept at "))
        .and_then(|rest| rest.split(';').next())
        .expect("kept path reported");
    fs::remove_file(kept).expect("cleanup");
}
