pub mod error;
pub mod config;
pub mod observability;
pub mod types;
pub mod interfaces;
pub mod upstream;
pub mod store;
pub mod pricing;
pub mod ratios;
pub mod filter;
pub mod api;

// Key of the persisted ratio document in the durable store
pub const DURABLE_CACHE_KEY: &str = "ratios-cache.json";

// Profile selector for `config/{profile}.toml`
pub const PROFILE_ENV_VAR: &str = "RATIO_PROXY_ENV";
pub const DEFAULT_PROFILE: &str = "development";
