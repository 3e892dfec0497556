use std::io;

use tracing_subscriber::EnvFilter;

/// Environment variable holding an [`EnvFilter`] directive that replaces the
/// default filter.
pub const LOG_ENV: &str = "ZIPSERIES_LOG";

const QUIET: &str = "warn";
const VERBOSE: &str = "warn,zipseries=info";

/// Builds the event filter for a run.
///
/// [`LOG_ENV`] wins when it holds a valid directive. Otherwise only warnings
/// are shown, plus `info` progress under `zipseries::*` targets when
/// `verbose` is set.
#[must_use]
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| default_filter(verbose))
}

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose { VERBOSE } else { QUIET })
}

/// Installs a formatting subscriber writing to standard error.
///
/// Returns `false` when a global subscriber was already installed, which
/// leaves the existing one in place.
pub fn init_tracing(verbose: bool) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_filter_hides_progress() {
        assert_eq!(default_filter(false).to_string(), "warn");
    }

    #[test]
    fn verbose_filter_enables_zipseries_targets() {
        let rendered = default_filter(true).to_string();
        assert!(rendered.contains("zipseries=info"), "{rendered}");
        assert!(rendered.contains("warn"), "{rendered}");
    }
}
