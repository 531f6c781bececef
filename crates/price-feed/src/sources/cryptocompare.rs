//! CryptoCompare single-symbol price

use serde_json::Value;

use steemfeed_core::{Exchange, SourceResult};

use super::{number_at, positive_price, PriceSource};

const CRYPTOCOMPARE_URL: &str = "https://min-api.cryptocompare.com/data/price?fsym=STEEM&tsyms=USDT";

#[derive(Debug, Clone, Copy, Default)]
pub struct CryptocompareSource;

impl PriceSource for CryptocompareSource {
    fn exchange(&self) -> Exchange {
        Exchange::Cryptocompare
    }

    fn url(&self) -> String {
        CRYPTOCOMPARE_URL.to_string()
    }

    fn extract_price(&self, body: &Value) -> SourceResult<f64> {
        let price = number_at(self.exchange(), body, "/USDT")?;
        positive_price(self.exchange(), price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract() {
        let body = json!({"USDT": 0.2299});
        assert_eq!(CryptocompareSource.extract_price(&body).unwrap(), 0.2299);
    }

    #[test]
    fn test_error_response() {
        let body = json!({"Response": "Error", "Message": "market does not exist"});
        assert!(CryptocompareSource.extract_price(&body).is_err());
    }
}
