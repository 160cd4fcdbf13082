use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or blank.
pub const DEFAULT_LOG_FILTER: &str = "sopindex=info,sopindex_core=info";

/// Builds the log filter from a `RUST_LOG` value.
///
/// A non-blank value replaces the defaults entirely, so
/// `RUST_LOG=sopindex_core=debug` takes effect as written.
pub fn log_filter(rust_log: Option<&str>) -> Result<EnvFilter, ParseError> {
    match rust_log.map(str::trim).filter(|v| !v.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives),
        None => EnvFilter::try_new(DEFAULT_LOG_FILTER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        for value in [None, Some(""), Some("  ")] {
            let filter = log_filter(value).unwrap().to_string();
            assert!(filter.contains("sopindex=info"), "got {filter}");
            assert!(filter.contains("sopindex_core=info"), "got {filter}");
        }
    }

    #[test]
    fn test_rust_log_overrides_crate_level() {
        let filter = log_filter(Some("sopindex_core=debug")).unwrap().to_string();
        assert!(filter.contains("sopindex_core=debug"), "got {filter}");
        assert!(!filter.contains("sopindex_core=info"), "got {filter}");
    }

    #[test]
    fn test_invalid_directive_rejected() {
        assert!(log_filter(Some("sopindex_core=loud")).is_err());
    }
}
