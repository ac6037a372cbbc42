use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV_VAR: &str = "REPORT_TABLE_LOG";

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Raise the default level to debug
    pub verbose: bool,
    /// Default directive when the env var is unset
    pub level: String,
    /// Also append to this file
    pub log_file: Option<PathBuf>,
}

/// The env var wins, then `--verbose`, then the configured level
pub fn filter_directive(env_value: Option<String>, verbose: bool, level: &str) -> String {
    match env_value {
        Some(value) if !value.trim().is_empty() => value,
        _ if verbose => "debug".to_string(),
        _ if level.trim().is_empty() => "warn".to_string(),
        _ => level.to_string(),
    }
}

/// Install the global subscriber: compact lines on stderr, plus a
/// timestamped copy in `log_file` when set
pub fn init_tracing(options: &LogOptions) -> Result<()> {
    let directive = filter_directive(std::env::var(LOG_ENV_VAR).ok(), options.verbose, &options.level);
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter '{}'", directive))?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .without_time()
        .compact();

    let file_layer = match &options.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_timer(LocalTime::rfc_3339())
                    .with_target(true)
                    .with_ansi(false)
                    .compact(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    if let Some(path) = &options.log_file {
        tracing::info!(target: "table", "Logging to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_precedence() {
        assert_eq!(
            filter_directive(Some("export=trace".into()), true, "warn"),
            "export=trace"
        );
        assert_eq!(filter_directive(None, true, "warn"), "debug");
        assert_eq!(filter_directive(Some(" ".into()), false, "info"), "info");
        assert_eq!(filter_directive(None, false, ""), "warn");
    }
}
