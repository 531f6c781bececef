//! Bittrex v3 market ticker

use serde_json::Value;

use steemfeed_core::{Exchange, SourceResult};

use super::{number_at, positive_price, PriceSource};

const BITTREX_TICKER_URL: &str = "https://api.bittrex.com/v3/markets/STEEM-USDT/ticker";

#[derive(Debug, Clone, Copy, Default)]
pub struct BittrexSource;

impl PriceSource for BittrexSource {
    fn exchange(&self) -> Exchange {
        Exchange::Bittrex
    }

    fn url(&self) -> String {
        BITTREX_TICKER_URL.to_string()
    }

    fn extract_price(&self, body: &Value) -> SourceResult<f64> {
        let price = number_at(self.exchange(), body, "/lastTradeRate")?;
        positive_price(self.exchange(), price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract() {
        let body = json!({
            "symbol": "STEEM-USDT",
            "lastTradeRate": "0.24100000",
            "bidRate": "0.24000000",
            "askRate": "0.24200000"
        });
        assert_eq!(BittrexSource.extract_price(&body).unwrap(), 0.241);
    }

    #[test]
    fn test_zero_rate_rejected() {
        let body = json!({"lastTradeRate": "0"});
        assert!(BittrexSource.extract_price(&body).is_err());
    }
}
