use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Price cache metrics
    pub static ref PRICE_CACHE_HITS: IntCounter = IntCounter::new(
        "price_cache_hits_total",
        "Price history requests served from cache"
    ).expect("valid metric");

    pub static ref PRICE_CACHE_MISSES: IntCounter = IntCounter::new(
        "price_cache_misses_total",
        "Price history requests that went upstream"
    ).expect("valid metric");

    // Upstream metrics
    pub static ref UPSTREAM_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("upstream_requests_total", "Outbound upstream requests"),
        &["target", "outcome"]
    ).expect("valid metric");

    // Ratio reconciliation metrics
    pub static ref LIVE_PATCHES: IntCounter = IntCounter::new(
        "ratio_live_patches_total",
        "Assets whose missing day was filled from the live feed"
    ).expect("valid metric");

    pub static ref DURABLE_CACHE_WRITES: IntCounter = IntCounter::new(
        "durable_cache_writes_total",
        "Durable ratio cache rewrites"
    ).expect("valid metric");

    pub static ref DURABLE_CACHE_FAILURES: IntCounter = IntCounter::new(
        "durable_cache_failures_total",
        "Durable ratio cache loads or saves that failed"
    ).expect("valid metric");

    // Latency metrics
    pub static ref REQUEST_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "proxy_request_latency_seconds",
            "End-to-end latency of proxied API requests"
        ).buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0])
    ).expect("valid metric");
}

pub fn register_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(PRICE_CACHE_HITS.clone()))?;
    REGISTRY.register(Box::new(PRICE_CACHE_MISSES.clone()))?;
    REGISTRY.register(Box::new(UPSTREAM_REQUESTS.clone()))?;
    REGISTRY.register(Box::new(LIVE_PATCHES.clone()))?;
    REGISTRY.register(Box::new(DURABLE_CACHE_WRITES.clone()))?;
    REGISTRY.register(Box::new(DURABLE_CACHE_FAILURES.clone()))?;
    REGISTRY.register(Box::new(REQUEST_LATENCY.clone()))?;
    Ok(())
}

/// Text exposition of everything registered on `REGISTRY`.
pub fn render() -> String {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
