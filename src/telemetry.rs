use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec, Encoder, TextEncoder};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

lazy_static! {
    pub static ref API_REQUESTS_CNTR: CounterVec = register_counter_vec!(
        "quiz_admin_api_requests_total",
        "Number of requests sent to the quiz API",
        &["operation", "outcome"]
    )
    .unwrap();
}

/// Counts one finished call against the quiz API.
pub fn record_api_call(operation: &str, outcome: &str) {
    API_REQUESTS_CNTR
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Renders every registered metric in the Prometheus text format.
pub fn encode_metrics() -> anyhow::Result<(String, Vec<u8>)> {
    let encoder = TextEncoder::new();
    let mut buf = vec![];
    encoder.encode(&prometheus::gather(), &mut buf)?;
    Ok((encoder.format_type().to_owned(), buf))
}

pub fn init_tracing() {
    let mut fmt_layer = fmt::layer().with_target(false);
    if std::env::var("INCLUDE_SPAN_EVENTS").is_ok_and(|value| value.eq_ignore_ascii_case("true")) {
        fmt_layer = fmt_layer.with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);
    }
    let filter_layer = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
