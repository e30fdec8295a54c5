//! Logging setup: a `tracing` subscriber writing to stderr.
//!
//! stdout carries tagging output, so every log line goes to stderr. The
//! filter comes from, in order: `RUST_LOG`, `--verbose`, then
//! `logging.level` in the config. `logging.level` accepts any `EnvFilter`
//! directive, e.g. `warn` or `info,imtag_core::hierarchy=trace`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Directive used by `--verbose`.
///
/// Only imtag's own crates go to debug; `ort` logs session internals at
/// debug and would drown out per-image timings.
const VERBOSE_DIRECTIVE: &str = "info,imtag=debug,imtag_core=debug";

/// Install the global subscriber.
///
/// `directive` is used unless `RUST_LOG` is set.
pub fn init(directive: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Install the subscriber described by the `[logging]` config section.
///
/// `--verbose` and `--json-logs` win over the config file.
pub fn init_from_config(
    config: &imtag_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let directive = filter_directive(&config.logging.level, verbose_override);
    let json_format = json_logs_override || config.logging.format == "json";
    init(&directive, json_format);
}

/// Filter directive for a configured level.
///
/// A level `EnvFilter` cannot parse falls back to `info` rather than
/// silencing everything.
fn filter_directive(level: &str, verbose: bool) -> String {
    if verbose {
        return VERBOSE_DIRECTIVE.to_string();
    }
    let level = level.trim();
    if level.is_empty() || EnvFilter::try_new(level).is_err() {
        return "info".to_string();
    }
    level.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_scopes_debug_to_imtag() {
        assert_eq!(filter_directive("warn", true), VERBOSE_DIRECTIVE);
        assert!(EnvFilter::try_new(VERBOSE_DIRECTIVE).is_ok());
    }

    #[test]
    fn test_config_directive_passes_through() {
        assert_eq!(filter_directive("warn", false), "warn");
        assert_eq!(
            filter_directive(" info,imtag_core=trace ", false),
            "info,imtag_core=trace"
        );
    }

    #[test]
    fn test_invalid_level_falls_back_to_info() {
        assert_eq!(filter_directive("", false), "info");
        assert_eq!(filter_directive("imtag_core=loud", false), "info");
    }
}
