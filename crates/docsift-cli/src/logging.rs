use tracing_subscriber::EnvFilter;

use crate::cli::LogFormat;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "DOCSIFT_LOG";

/// Install the global subscriber. Logs go to stderr so stdout stays reserved
/// for command output. A second call is a no-op.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
