//! Binance spot ticker

use serde_json::Value;

use steemfeed_core::{Exchange, FetchStage, SourceError, SourceResult};

use super::{number_at, positive_price, PriceSource};

const BINANCE_TICKER_URL: &str = "https://api.binance.com/api/v3/ticker/price?symbol=STEEMUSDT";

#[derive(Debug, Clone, Copy, Default)]
pub struct BinanceSource;

impl PriceSource for BinanceSource {
    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    fn url(&self) -> String {
        BINANCE_TICKER_URL.to_string()
    }

    fn extract_price(&self, body: &Value) -> SourceResult<f64> {
        // Errors come back as {"code": -1121, "msg": "Invalid symbol."}
        if let Some(msg) = body.get("msg").and_then(Value::as_str) {
            return Err(SourceError::new(self.exchange(), FetchStage::Extract, msg));
        }
        let price = number_at(self.exchange(), body, "/price")?;
        positive_price(self.exchange(), price)
    }
}
