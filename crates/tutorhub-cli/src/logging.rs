// Logging setup

use tracing_subscriber::EnvFilter;

const CRATES: [&str; 6] = [
    "tutorhub_cli",
    "tutorhub_config",
    "tutorhub_course",
    "tutorhub_http",
    "tutorhub_lecture",
    "tutorhub_session",
];

/// Filter used when `RUST_LOG` is unset
pub fn default_directives(verbose: bool) -> String {
    if !verbose {
        return "info".to_string();
    }
    let mut directives = vec!["info".to_string()];
    directives.extend(CRATES.iter().map(|c| format!("{}=debug", c)));
    directives.join(",")
}

/// Initialize the tracing subscriber on stderr
///
/// `RUST_LOG` wins over `--verbose` when set. Calling this twice is harmless.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_parse() {
        assert!(EnvFilter::try_new(default_directives(true)).is_ok());
        assert_eq!(default_directives(false), "info");
        assert!(default_directives(true).contains("tutorhub_lecture=debug"));
    }
}
