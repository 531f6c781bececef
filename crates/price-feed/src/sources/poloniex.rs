//! Poloniex market prices with triangulation
//!
//! Poloniex does not always list STEEM against USDT, so the price may have
//! to be derived through an intermediate asset. Strategies are tried in
//! order and the first one whose pairs are all listed and whose product is
//! positive wins.

use serde_json::Value;
use std::collections::HashMap;

use steemfeed_core::{Exchange, FetchStage, SourceError, SourceResult};

use super::{as_number, PriceSource};

const POLONIEX_PRICES_URL: &str = "https://api.poloniex.com/markets/price";

/// A way to reach STEEM/USDT: the product of the listed pair rates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingStrategy {
    pub name: &'static str,
    pub pairs: &'static [&'static str],
}

impl PricingStrategy {
    pub fn evaluate(&self, rates: &HashMap<String, f64>) -> Option<f64> {
        let price = self
            .pairs
            .iter()
            .map(|pair| rates.get(*pair).copied())
            .product::<Option<f64>>()?;
        (price.is_finite() && price > 0.0).then_some(price)
    }
}

/// Evaluation order: the direct pair, then via BTC, then via TRX
pub const STEEM_USDT_STRATEGIES: [PricingStrategy; 3] = [
    PricingStrategy {
        name: "direct",
        pairs: &["STEEM_USDT"],
    },
    PricingStrategy {
        name: "via BTC",
        pairs: &["STEEM_BTC", "BTC_USDT"],
    },
    PricingStrategy {
        name: "via TRX",
        pairs: &["STEEM_TRX", "TRX_USDT"],
    },
];

#[derive(Debug, Clone)]
pub struct PoloniexSource {
    strategies: Vec<PricingStrategy>,
}

impl Default for PoloniexSource {
    fn default() -> Self {
        Self::with_strategies(STEEM_USDT_STRATEGIES.to_vec())
    }
}

impl PoloniexSource {
    pub fn with_strategies(strategies: Vec<PricingStrategy>) -> Self {
        Self { strategies }
    }

    /// First strategy yielding a positive price
    pub fn triangulate(&self, rates: &HashMap<String, f64>) -> Option<(PricingStrategy, f64)> {
        self.strategies
            .iter()
            .find_map(|s| s.evaluate(rates).map(|price| (*s, price)))
    }

    /// Symbol → rate for every entry with a usable price
    fn collect_rates(&self, body: &Value) -> SourceResult<HashMap<String, f64>> {
        let entries = body.as_array().ok_or_else(|| {
            SourceError::new(self.exchange(), FetchStage::Extract, "expected an array of markets")
        })?;

        Ok(entries
            .iter()
            .filter_map(|entry| {
                let symbol = entry.get("symbol")?.as_str()?;
                let price = as_number(entry.get("price")?)?;
                Some((symbol.to_string(), price))
            })
            .collect())
    }
}

impl PriceSource for PoloniexSource {
    fn exchange(&self) -> Exchange {
        Exchange::Poloniex
    }

    fn url(&self) -> String {
        POLONIEX_PRICES_URL.to_string()
    }

    fn extract_price(&self, body: &Value) -> SourceResult<f64> {
        let rates = self.collect_rates(body)?;
        match self.triangulate(&rates) {
            Some((strategy, price)) => {
                tracing::debug!(strategy = strategy.name, price, "poloniex price derived");
                Ok(price)
            }
            None => Err(SourceError::new(
                self.exchange(),
                FetchStage::Validate,
                "no pricing path yielded a positive STEEM/USDT rate",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn market(symbol: &str, price: &str) -> Value {
        json!({"symbol": symbol, "price": price, "time": 1700000000000u64})
    }

    #[test]
    fn test_via_btc() {
        let body = json!([market("STEEM_BTC", "0.00002"), market("BTC_USDT", "60000")]);
        let price = PoloniexSource::default().extract_price(&body).unwrap();
        assert!((price - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_direct_only() {
        let body = json!([market("STEEM_USDT", "1.5"), market("ETH_USDT", "3000")]);
        assert_eq!(PoloniexSource::default().extract_price(&body).unwrap(), 1.5);
    }

    #[test]
    fn test_direct_takes_precedence() {
        let body = json!([
            market("STEEM_BTC", "0.00002"),
            market("BTC_USDT", "60000"),
            market("STEEM_USDT", "1.5"),
        ]);
        assert_eq!(PoloniexSource::default().extract_price(&body).unwrap(), 1.5);
    }

    #[test]
    fn test_via_trx_when_btc_leg_missing() {
        let body = json!([
            market("STEEM_BTC", "0.00002"),
            market("STEEM_TRX", "2"),
            market("TRX_USDT", "0.125"),
        ]);
        assert_eq!(PoloniexSource::default().extract_price(&body).unwrap(), 0.25);
    }

    #[test]
    fn test_non_positive_path_skipped() {
        let body = json!([
            market("STEEM_USDT", "0"),
            market("STEEM_TRX", "2"),
            market("TRX_USDT", "0.125"),
        ]);
        assert_eq!(PoloniexSource::default().extract_price(&body).unwrap(), 0.25);
    }

    #[test]
    fn test_no_path_is_validate_error() {
        let body = json!([market("STEEM_BTC", "0"), market("BTC_USDT", "60000")]);
        let err = PoloniexSource::default().extract_price(&body).unwrap_err();
        assert_eq!(err.stage, FetchStage::Validate);
    }

    #[test]
    fn test_object_body_rejected() {
        let body = json!({"code": 500, "message": "System error"});
        let err = PoloniexSource::default().extract_price(&body).unwrap_err();
        assert_eq!(err.stage, FetchStage::Extract);
    }

    #[test]
    fn test_custom_strategy_order() {
        let source = PoloniexSource::with_strategies(vec![
            STEEM_USDT_STRATEGIES[2],
            STEEM_USDT_STRATEGIES[0],
        ]);
        let body = json!([
            market("STEEM_USDT", "1.5"),
            market("STEEM_TRX", "2"),
            market("TRX_USDT", "0.125"),
        ]);
        assert_eq!(source.extract_price(&body).unwrap(), 0.25);

        let no_paths = PoloniexSource::with_strategies(Vec::new());
        let err = no_paths.extract_price(&body).unwrap_err();
        assert_eq!(err.stage, FetchStage::Validate);
    }

    #[test]
    fn test_triangulate_reports_strategy() {
        let rates: HashMap<String, f64> =
            [("STEEM_TRX".to_string(), 2.0), ("TRX_USDT".to_string(), 0.1)]
                .into_iter()
                .collect();
        let (strategy, _) = PoloniexSource::default().triangulate(&rates).unwrap();
        assert_eq!(strategy.name, "via TRX");
    }
}
