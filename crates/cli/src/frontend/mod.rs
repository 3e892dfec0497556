mod arguments;
mod command_builder;
mod config_file;
mod endpoint;
mod prompt;

use std::ffi::OsString;
use std::io::{self, Write};

use clap::error::ErrorKind;
use is_terminal::IsTerminal;
use logging::{ConsoleReporter, init_tracing};
use transport::{FtpConnector, SessionOptions};
use zipseries_core::branding::{PROGRAM_NAME, VERSION, config_path};
use zipseries_core::{
    ConfigError, Configuration, ExitCode, MigrationError, Role, SecretPrompt, Step,
};

use arguments::{ParsedArgs, parse_args};
pub use prompt::{
    ObjectPrompt, SOURCE_PASSWORD_ENV, TARGET_PASSWORD_ENV, TerminalObjectPrompt, TerminalPrompt,
    parse_object_list,
};

/// The operator-facing parts of a run: how passwords and objects are asked
/// for, and whether console output is coloured.
pub struct Interaction<'a> {
    /// Source of passwords that were not configured.
    pub secrets: &'a mut dyn SecretPrompt,
    /// Source of the object list when none was configured.
    pub objects: &'a mut dyn ObjectPrompt,
    /// Colour the outcome lines.
    pub styled: bool,
}

/// Runs zipSeries with terminal prompts and returns the process exit code.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
    Out: Write,
    Err: Write,
{
    let mut secrets = TerminalPrompt::new();
    let mut objects = TerminalObjectPrompt::new();
    let mut interaction = Interaction {
        secrets: &mut secrets,
        objects: &mut objects,
        styled: io::stderr().is_terminal(),
    };
    run_with(arguments, stdout, stderr, &mut interaction)
}

/// Runs zipSeries with the given prompts and returns the process exit code.
pub fn run_with<I, S, Out, Err>(
    arguments: I,
    stdout: &mut Out,
    stderr: &mut Err,
    interaction: &mut Interaction<'_>,
) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
    Out: Write,
    Err: Write,
{
    let parsed = match parse_args(arguments) {
        Ok(parsed) => parsed,
        Err(error) => return report_usage(&error, stdout, stderr),
    };
    if parsed.show_version {
        return match writeln!(stdout, "{PROGRAM_NAME} {VERSION}") {
            Ok(()) => ExitCode::Ok.as_i32(),
            Err(_) => ExitCode::Configuration.as_i32(),
        };
    }

    let options = parsed.options;
    let config = match configuration(parsed, interaction.objects) {
        Ok(config) => config,
        Err(error) => {
            let error = MigrationError::from(error);
            let mut console = ConsoleReporter::new(stderr, interaction.styled);
            let _ = console.error(Some(Step::Validate), &error);
            return error.exit_code().as_i32();
        }
    };

    init_tracing(config.verbose);
    execute(&config, options, stdout, stderr, interaction)
}

fn execute<Out: Write, Err: Write>(
    config: &Configuration,
    options: SessionOptions,
    stdout: &mut Out,
    stderr: &mut Err,
    interaction: &mut Interaction<'_>,
) -> i32 {
    let mut connector = FtpConnector::new(options);
    let outcome = zipseries_core::run(config, interaction.secrets, &mut connector);

    let written = if outcome.is_success() {
        ConsoleReporter::new(stdout, interaction.styled).outcome(&outcome)
    } else {
        ConsoleReporter::new(stderr, interaction.styled).outcome(&outcome)
    };
    if let Err(error) = written {
        tracing::warn!(target: "zipseries::run", "cannot write the run summary: {error}");
    }
    outcome.exit_code().as_i32()
}

/// Builds the run configuration: command line first, then config-file
/// fallbacks, then the object prompt.
fn configuration(
    parsed: ParsedArgs,
    objects: &mut dyn ObjectPrompt,
) -> Result<Configuration, ConfigError> {
    let ParsedArgs {
        verbose,
        mut source,
        mut target,
        source_config,
        target_config,
        ..
    } = parsed;

    if let Some(name) = source_config {
        source.fill_from(config_file::load(&config_path(&name), Role::Source)?);
    }
    if let Some(name) = target_config {
        target.fill_from(config_file::load(&config_path(&name), Role::Target)?);
    }

    let verbose = verbose || source.verbose == Some(true) || target.verbose == Some(true);
    let mut config = Configuration {
        verbose,
        source: source.into_source(),
        target: target.into_target(),
    };

    if config.target.local_save_file.is_none() && config.source.objects.is_none() {
        config.source.objects = objects.objects(config.source.library.as_ref())?;
    }
    Ok(config)
}

fn report_usage<Out: Write, Err: Write>(error: &clap::Error, stdout: &mut Out, stderr: &mut Err) -> i32 {
    let rendered = error.render();
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = write!(stdout, "{rendered}");
            ExitCode::Ok.as_i32()
        }
        _ => {
            let _ = write!(stderr, "{rendered}");
            ExitCode::Configuration.as_i32()
        }
    }
}

#[cfg(test)]
mod tests;
