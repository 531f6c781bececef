//! CoinMarketCap pro quotes API (requires an API key)

use serde_json::Value;

use steemfeed_core::{ConfigError, Exchange, SourceResult};

use super::{number_at, positive_price, PriceSource};

const COINMARKETCAP_URL: &str =
    "https://pro-api.coinmarketcap.com/v2/cryptocurrency/quotes/latest?symbol=STEEM";

#[derive(Clone)]
pub struct CoinMarketCapSource {
    api_key: String,
}

impl CoinMarketCapSource {
    pub fn new(api_key: &str) -> Result<Self, ConfigError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey(Exchange::Coinmarketcap));
        }
        Ok(Self {
            api_key: api_key.to_string(),
        })
    }
}

// Keep the key out of debug output
impl std::fmt::Debug for CoinMarketCapSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinMarketCapSource").finish_non_exhaustive()
    }
}

impl PriceSource for CoinMarketCapSource {
    fn exchange(&self) -> Exchange {
        Exchange::Coinmarketcap
    }

    fn url(&self) -> String {
        format!("{}&CMC_PRO_API_KEY={}", COINMARKETCAP_URL, self.api_key)
    }

    fn extract_price(&self, body: &Value) -> SourceResult<f64> {
        let price = number_at(self.exchange(), body, "/data/STEEM/0/quote/USD/price")?;
        positive_price(self.exchange(), price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_carries_key() {
        let source = CoinMarketCapSource::new("abc").unwrap();
        assert!(source.url().ends_with("&CMC_PRO_API_KEY=abc"));
        assert!(!format!("{:?}", source).contains("abc"));
    }

    #[test]
    fn test_blank_key_rejected() {
        assert!(CoinMarketCapSource::new("  ").is_err());
    }

    #[test]
    fn test_extract() {
        let source = CoinMarketCapSource::new("abc").unwrap();
        let body = json!({
            "data": {"STEEM": [{"id": 1230, "quote": {"USD": {"price": 0.2412}}}]}
        });
        assert_eq!(source.extract_price(&body).unwrap(), 0.2412);
    }

    #[test]
    fn test_auth_failure_body() {
        let source = CoinMarketCapSource::new("abc").unwrap();
        let body = json!({"status": {"error_code": 1001, "error_message": "This API Key is invalid."}});
        assert!(source.extract_price(&body).is_err());
    }
}
