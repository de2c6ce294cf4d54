use tracing::Span;
use tracing_subscriber::EnvFilter;
use crate::config::LogConfig;

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("tracing already initialised: {}", e);
    }
}

pub fn trace_ratio_request() -> Span {
    tracing::info_span!("ratio_request")
}

pub fn trace_price_request(coin: &str, currency: &str) -> Span {
    tracing::info_span!(
        "price_request",
        coin = %coin,
        currency = %currency,
    )
}
