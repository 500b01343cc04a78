//! Structured logging bootstrap shared by the transport core and the
//! `eapolclient` binary. Every caller should hold its own child
//! `slog::Logger` (`log.new(slog::o!(...))`) rather than logging against the
//! root directly, the same discipline `Channel`/`Endpoint` follow in the
//! codebase this crate's shape is lifted from.

pub use slog::{debug, error, info, o, trace, warn, Logger};
use sloggers::terminal::Destination;
use sloggers::types::Severity;
use sloggers::{Build, Config};

/// Source of a [`Logger`] config: either loaded from a TOML file on disk or
/// a sensible built-in default (terminal, debug level, stderr).
#[derive(Debug, Clone)]
pub enum LogConfigSource {
    Default,
    TomlFile(std::path::PathBuf),
}

const DEFAULT_CONFIG_TOML: &str = r#"
type = "terminal"
level = "debug"
destination = "stderr"
"#;

/// Builds the process-wide root logger.
pub fn init(source: LogConfigSource) -> Logger {
    let config: sloggers::LoggerConfig = match source {
        LogConfigSource::Default => serdeconv::from_toml_str(DEFAULT_CONFIG_TOML)
            .expect("built-in default logging config is malformed"),
        LogConfigSource::TomlFile(path) => {
            serdeconv::from_toml_file(&path).unwrap_or_else(|err| {
                panic!("failed to load logging config {}: {}", path.display(), err)
            })
        }
    };

    config
        .build_logger()
        .expect("failed to construct logger from config")
}

/// A logger that discards everything, for tests and for contexts (e.g.
/// standalone `eapol-wire` consumers) that don't want a dependency on a live
/// logging sink.
pub fn discard() -> Logger {
    Logger::root(slog::Discard, o!())
}

/// Convenience default matching `sloggers`' own terminal-at-info default,
/// used when a caller wants *a* logger without loading any config.
pub fn terminal_at(level: Severity) -> Logger {
    let mut builder = sloggers::terminal::TerminalLoggerBuilder::new();
    builder.level(level);
    builder.destination(Destination::Stderr);
    builder.build().expect("failed to build terminal logger")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_a_logger() {
        let log = init(LogConfigSource::Default);
        info!(log, "smoke test"; "ok" => true);
    }

    #[test]
    fn discard_does_not_panic_on_log() {
        let log = discard();
        trace!(log, "discarded");
    }
}
