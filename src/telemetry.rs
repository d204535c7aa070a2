use prometheus::{register_counter, register_counter_vec, Counter, CounterVec};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref QUIZ_QUESTIONS_SERVED: CounterVec = register_counter_vec!(
        "quiz_questions_served_total",
        "Number of questions handed out by the quiz endpoint",
        &["category"]
    )
    .unwrap();
    pub static ref QUESTIONS_CREATED: Counter = register_counter!(
        "questions_created_total",
        "Number of questions created through the API"
    )
    .unwrap();
    pub static ref QUESTIONS_DELETED: Counter = register_counter!(
        "questions_deleted_total",
        "Number of questions deleted through the API"
    )
    .unwrap();
}

const DEFAULT_FILTER: &str = "info,tower_http=debug";

/// Filter from `LOG_LEVEL`; a missing or unparsable value logs the API at
/// info and each HTTP request at debug.
fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn span_events(flag: Option<&str>) -> FmtSpan {
    match flag {
        Some(flag) if flag.eq_ignore_ascii_case("true") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::NONE,
    }
}

pub fn init_tracing() {
    let level = std::env::var("LOG_LEVEL").ok();
    let include_spans = std::env::var("INCLUDE_SPAN_EVENTS").ok();

    tracing_subscriber::registry()
        .with(env_filter(level.as_deref()))
        .with(fmt::layer().with_span_events(span_events(include_spans.as_deref())))
        .init();
}
