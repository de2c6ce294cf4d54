use std::collections::HashMap;
use serde::{Deserialize, Serialize};

pub mod server;
pub mod upstream;
pub mod cache;
pub mod store;
pub mod loader;

pub use cache::CacheConfig;
pub use loader::AppConfig;
pub use server::ServerConfig;
pub use store::{StoreConfig, StoreKind};
pub use upstream::UpstreamConfig;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Maps a `currency` query value to the coin whose USD series is the divisor.
    pub currency_coins: HashMap<String, String>,
}

impl PricingConfig {
    /// Coin id for a quote currency; unmapped currencies are taken as coin ids.
    pub fn base_coin_for(&self, currency: &str) -> String {
        let currency = currency.to_lowercase();
        self.currency_coins
            .get(&currency)
            .cloned()
            .unwrap_or(currency)
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        let currency_coins = [
            ("ada", "cardano"),
            ("btc", "bitcoin"),
            ("eth", "ethereum"),
            ("sol", "solana"),
        ]
        .into_iter()
        .map(|(currency, coin)| (currency.to_string(), coin.to_string()))
        .collect();

        PricingConfig { currency_coins }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_coin_uses_mapping() {
        let pricing = PricingConfig::default();
        assert_eq!(pricing.base_coin_for("ada"), "cardano");
        assert_eq!(pricing.base_coin_for("ADA"), "cardano");
    }

    #[test]
    fn test_unmapped_currency_is_coin_id() {
        let pricing = PricingConfig::default();
        assert_eq!(pricing.base_coin_for("snek"), "snek");
    }
}
