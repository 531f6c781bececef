//! Cloudflare worker proxying an aggregated quote
//!
//! The worker answers `{"result": ["<n> STEEM = <price> USDT", ...]}`; the
//! price is the fourth whitespace-separated token of the first line.

use serde_json::Value;

use steemfeed_core::{Exchange, FetchStage, SourceError, SourceResult};

use super::{positive_price, PriceSource};

const CLOUDFLARE_URL: &str = "https://price.justyy.workers.dev/query/?s=STEEM+USDT";
const PRICE_TOKEN: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct CloudflareSource;

impl PriceSource for CloudflareSource {
    fn exchange(&self) -> Exchange {
        Exchange::Cloudflare
    }

    fn url(&self) -> String {
        CLOUDFLARE_URL.to_string()
    }

    fn extract_price(&self, body: &Value) -> SourceResult<f64> {
        let exchange = self.exchange();
        let line = body
            .pointer("/result/0")
            .and_then(Value::as_str)
            .ok_or_else(|| SourceError::missing_field(exchange, "/result/0"))?;

        let token = line.split_whitespace().nth(PRICE_TOKEN).ok_or_else(|| {
            SourceError::new(exchange, FetchStage::Extract, format!("unexpected line: {}", line))
        })?;
        let price: f64 = token.parse().map_err(|_| {
            SourceError::new(exchange, FetchStage::Extract, format!("not a number: {}", token))
        })?;

        positive_price(exchange, price)
    }
}
