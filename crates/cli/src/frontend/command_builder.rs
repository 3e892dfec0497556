use clap::builder::PathBufValueParser;
use clap::{Arg, ArgAction, Command, value_parser};
use zipseries_core::branding::{BINARY_NAME, CONFIG_DIR, CONFIG_DIR_ENV, PROGRAM_NAME};
use zipseries_core::{
    LibraryName, ObjectSpec, ObjectType, ReleaseLevel, RemoteSaveFile,
};

const SOURCE: &str = "Source";
const TARGET: &str = "Target";
const TRANSPORT: &str = "Connection";

pub(crate) fn clap_command() -> Command {
    let command = Command::new(BINARY_NAME)
        .about(format!(
            "{PROGRAM_NAME}: save libraries and objects on one IBM i, restore them on another"
        ))
        .after_help(format!(
            "Config NAMEs resolve to {CONFIG_DIR}/NAME.conf ({CONFIG_DIR_ENV} overrides the \
             directory); values there only fill options not given on the command line."
        ))
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .long("version")
                .action(ArgAction::SetTrue)
                .help("Print version information and exit"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Report each step and remote command"),
        );
    let command = source_arguments(command);
    let command = target_arguments(command);
    transport_arguments(command)
}

fn source_arguments(command: Command) -> Command {
    command
        .next_help_heading(SOURCE)
        .arg(text("source-svr", 's', "HOST", "Source system host name"))
        .arg(text("source-usr", 'u', "USER", "Source user profile"))
        .arg(text("source-pwd", 'p', "PASSWORD", "Source password (prompted for when absent)"))
        .arg(
            Arg::new("source-lib")
                .short('l')
                .long("source-lib")
                .value_name("LIBRARY")
                .value_parser(|value: &str| value.parse::<LibraryName>())
                .help("Library to save"),
        )
        .arg(
            Arg::new("source-obj")
                .short('o')
                .long("source-obj")
                .value_name("NAME[:TYPE,...]")
                .num_args(1..)
                .action(ArgAction::Append)
                .value_parser(|value: &str| value.parse::<ObjectSpec>())
                .help("Objects to save instead of the whole library"),
        )
        .arg(
            Arg::new("source-obj-type")
                .long("source-obj-type")
                .value_name("TYPE")
                .num_args(1..)
                .action(ArgAction::Append)
                .value_parser(|value: &str| value.parse::<ObjectType>())
                .help("Object types for objects without their own (default *ALL)"),
        )
        .arg(text("source-config", 'c', "NAME", "Read missing source options from config NAME"))
        .arg(
            Arg::new("source-save-file")
                .long("source-save-file")
                .value_name("PATH")
                .value_parser(PathBufValueParser::new())
                .help("Save only: keep the save file at PATH"),
        )
        .arg(
            Arg::new("source-remote-savf")
                .long("source-remote-savf")
                .value_name("LIB/FILE")
                .value_parser(|value: &str| value.parse::<RemoteSaveFile>())
                .help("Save file on the source system (default QTEMP/ZIPSERIES)"),
        )
}

fn target_arguments(command: Command) -> Command {
    command
        .next_help_heading(TARGET)
        .arg(
            Arg::new("target-release")
                .long("target-release")
                .value_name("RELEASE")
                .value_parser(|value: &str| value.parse::<ReleaseLevel>())
                .help(format!(
                    "Release to save for: {} (default *CURRENT)",
                    ReleaseLevel::supported_list()
                )),
        )
        .arg(text("target-svr", 'S', "HOST", "Target system host name"))
        .arg(text("target-usr", 'U', "USER", "Target user profile"))
        .arg(text("target-pwd", 'P', "PASSWORD", "Target password (prompted for when absent)"))
        .arg(
            Arg::new("target-lib")
                .short('L')
                .long("target-lib")
                .value_name("LIBRARY")
                .value_parser(|value: &str| value.parse::<LibraryName>())
                .help("Library to restore into"),
        )
        .arg(text("target-config", 'C', "NAME", "Read missing target options from config NAME"))
        .arg(
            Arg::new("target-save-file")
                .long("target-save-file")
                .value_name("PATH")
                .value_parser(PathBufValueParser::new())
                .help("Restore only: restore from the local save file PATH"),
        )
        .arg(
            Arg::new("target-remote-savf")
                .long("target-remote-savf")
                .value_name("LIB/FILE")
                .value_parser(|value: &str| value.parse::<RemoteSaveFile>())
                .help("Save file on the target system (default QTEMP/ZIPSERIES)"),
        )
}

fn transport_arguments(command: Command) -> Command {
    command
        .next_help_heading(TRANSPORT)
        .arg(
            Arg::new("port")
                .long("port")
                .value_name("PORT")
                .value_parser(value_parser!(u16).range(1..))
                .help("FTP control port on both systems (default 21)"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .value_parser(value_parser!(u64))
                .help("Give up when a host is silent this long; 0 waits forever (default)"),
        )
        .arg(
            Arg::new("contimeout")
                .long("contimeout")
                .value_name("SECONDS")
                .value_parser(value_parser!(u64))
                .help("Connection timeout; 0 waits forever (default 30)"),
        )
}

fn text(id: &'static str, short: char, value_name: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .short(short)
        .long(id)
        .value_name(value_name)
        .help(help)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        clap_command().debug_assert();
    }
}
