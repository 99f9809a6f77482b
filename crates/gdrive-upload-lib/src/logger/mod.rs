use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the tracing subscriber with timestamp, level, and structured fields.
///
/// `RUST_LOG` wins when set. Otherwise the level is DEBUG if `debug` is true
/// and INFO if not.
pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(debug));

    fmt()
        .with_env_filter(filter)
        .with_timer(fmt::time::SystemTime)
        .with_level(true)
        .with_target(false)
        .init();
}

fn default_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

/// Whether the runner asked for step debug logging (`RUNNER_DEBUG=1`).
pub fn runner_debug_enabled() -> bool {
    is_debug_flag(std::env::var("RUNNER_DEBUG").ok().as_deref())
}

fn is_debug_flag(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("1") | Some("true"))
}
