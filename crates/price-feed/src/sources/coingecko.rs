//! CoinGecko simple price endpoint

use serde_json::Value;

use steemfeed_core::{Exchange, SourceResult};

use super::{number_at, positive_price, PriceSource};

const COINGECKO_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=steem&vs_currencies=usd";

#[derive(Debug, Clone, Copy, Default)]
pub struct CoingeckoSource;

impl PriceSource for CoingeckoSource {
    fn exchange(&self) -> Exchange {
        Exchange::Coingecko
    }

    fn url(&self) -> String {
        COINGECKO_URL.to_string()
    }

    fn extract_price(&self, body: &Value) -> SourceResult<f64> {
        let price = number_at(self.exchange(), body, "/steem/usd")?;
        positive_price(self.exchange(), price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract() {
        let body = json!({"steem": {"usd": 0.231}});
        assert_eq!(CoingeckoSource.extract_price(&body).unwrap(), 0.231);
    }

    #[test]
    fn test_rate_limited_body() {
        let body = json!({"status": {"error_code": 429, "error_message": "rate limited"}});
        assert!(CoingeckoSource.extract_price(&body).is_err());
    }
}
