use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Installs the JSON subscriber and routes `log` records from teloxide and sqlx into it.
pub fn init_tracing(log_level: &str) {
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("failed to bridge log records: {e}");
    }

    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_span_events(FmtSpan::ENTER)
        .log_internal_errors(true)
        .with_line_number(true)
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {e}");
    }
}
