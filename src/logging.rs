//! Tracing setup. The TUI owns the terminal, so events go to a daily log
//! file under `.logs/`.

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "subsonic-rs";
const DEFAULT_FILTER: &str = "subsonic_rs=debug,warn";

/// Pick the filter directives: `RUST_LOG`, then the config file, then
/// [`DEFAULT_FILTER`]. Blank values count as unset.
fn filter_directives(from_env: Option<String>, configured: Option<&str>) -> String {
    from_env
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            configured
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install the global subscriber writing to `.logs/subsonic-rs.YYYY-MM-DD`.
pub fn init_logging(configured_filter: Option<&str>) -> anyhow::Result<()> {
    std::fs::create_dir_all(LOG_DIR)?;

    let appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, LOG_FILE_PREFIX);
    let (writer, flush_guard) = tracing_appender::non_blocking(appender);
    // Lives for the whole process; dropping it stops the writer thread
    Box::leak(Box::new(flush_guard));

    let directives = filter_directives(std::env::var(EnvFilter::DEFAULT_ENV).ok(), configured_filter);
    let filter = EnvFilter::try_new(&directives)?;

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()?;

    tracing::info!(dir = LOG_DIR, filter = %directives, "Logging initialized");
    Ok(())
}

/// Log the outcome of a library service call
#[macro_export]
macro_rules! log_api_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::debug!(operation = $operation, "Library call succeeded"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "Library call failed"),
        }
    };
}

/// Log the start of a library service call with its arguments
#[macro_export]
macro_rules! log_api_request {
    ($operation:expr, $($field:tt)*) => {
        tracing::debug!(operation = $operation, $($field)*, "Library call");
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_wins_over_config() {
        assert_eq!(
            filter_directives(Some("trace".to_string()), Some("info")),
            "trace"
        );
    }

    #[test]
    fn test_config_then_default() {
        assert_eq!(filter_directives(None, Some("subsonic_rs=info")), "subsonic_rs=info");
        assert_eq!(filter_directives(Some("  ".to_string()), None), DEFAULT_FILTER);
        assert_eq!(filter_directives(None, Some("")), DEFAULT_FILTER);
    }
}
