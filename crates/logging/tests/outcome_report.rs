use std::path::PathBuf;

use logging::ConsoleReporter;
use protocol::ReplyCode;
use transport::CommandResult;
use zipseries_core::{MigrationError, MigrationOutcome, MigrationReport, Role, Step};

fn rejected_restore() -> MigrationError {
    MigrationError::RemoteCommand {
        role: Role::Target,
        host: "tgt.example.com".to_owned(),
        result: CommandResult::new(
            "RSTLIB SAVLIB(PAYROLL) DEV(*SAVF) SAVF(QTEMP/ZIPSERIES) RSTLIB(PAYROLL2)",
            ReplyCode::new(550).expect("code"),
            vec![
                "Error occurred on command RSTLIB.".to_owned(),
                "CPF3773: 0 objects restored.".to_owned(),
            ],
        ),
    }
}

fn render(outcome: &MigrationOutcome) -> String {
    let mut console = ConsoleReporter::new(Vec::new(), false);
    console.outcome(outcome).expect("write");
    String::from_utf8(console.into_inner()).expect("utf-8")
}

#[test]
fn failure_lists_host_messages_under_the_error() {
    let outcome = MigrationOutcome::Failure {
        report: MigrationReport::default(),
        step: Step::Restore,
        error: rejected_restore(),
    };

    let output = render(&outcome);
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(
        lines,
        [
            "zipSeries: error: remote command error: restore: target host tgt.example.com rejected RSTLIB",
            "    Error occurred on command RSTLIB.",
            "    CPF3773: 0 objects restored.",
        ]
    );
}

#[test]
fn partial_failure_without_artifact_reports_only_the_error() {
    let outcome = MigrationOutcome::PartialFailure {
        report: MigrationReport::default(),
        failed: Step::Upload,
        error: rejected_restore(),
    };

    let output = render(&outcome);

    assert!(output.starts_with("zipSeries: error: remote command error: upload save file:"));
    assert!(!output.contains("kept at"));
}

#[test]
fn success_with_nothing_completed_prints_nothing() {
    let outcome = MigrationOutcome::Success(MigrationReport::default());
    assert_eq!(render(&outcome), "");
}

#[test]
fn info_lines_carry_the_program_name() {
    let mut console = ConsoleReporter::new(Vec::new(), false);
    let path = PathBuf::from("/tmp/x.savf");
    console
        .info(format_args!("save file kept at {}", path.display()))
        .expect("write");
    assert_eq!(
        String::from_utf8(console.into_inner()).expect("utf-8"),
        "zipSeries: save file kept at /tmp/x.savf\n"
    );
}
