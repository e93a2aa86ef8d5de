//! Utilities: logging setup (level derived from -v / -q), boolean parsing of
//! user-supplied strings.

/// Logging helpers.
pub mod logging {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::EnvFilter;

    /// quiet -> errors only; default -> warnings; -v -> debug; -vv -> trace.
    pub fn derive_level(verbose: u8, quiet: bool) -> LevelFilter {
        if quiet {
            return LevelFilter::ERROR;
        }
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Install the global subscriber. Logs go to stderr so stdout carries
    /// only command output. `RUST_LOG` overrides the derived level.
    pub fn init_logging(level: LevelFilter) {
        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

pub use logging::{derive_level, init_logging};

/// `t`, `true`, `yes`, `1` (any case, surrounding whitespace ignored) are
/// true; everything else is false.
pub fn string_to_bool(arg: &str) -> bool {
    matches!(
        arg.trim().to_ascii_lowercase().as_str(),
        "t" | "true" | "yes" | "1"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn levels_from_flags() {
        assert_eq!(derive_level(3, true), LevelFilter::ERROR);
        assert_eq!(derive_level(0, false), LevelFilter::WARN);
        assert_eq!(derive_level(1, false), LevelFilter::DEBUG);
        assert_eq!(derive_level(2, false), LevelFilter::TRACE);
    }

    #[test]
    fn bool_strings() {
        for s in ["true", " TRUE ", "t", "yes", "1"] {
            assert!(string_to_bool(s), "{s}");
        }
        for s in ["false", "no", "0", "", "on"] {
            assert!(!string_to_bool(s), "{s}");
        }
    }
}
