//! Quote API implementations, one per exchange

mod binance;
mod bittrex;
mod cloudflare;
mod coingecko;
mod coinmarketcap;
mod cryptocompare;
mod poloniex;

pub use binance::BinanceSource;
pub use bittrex::BittrexSource;
pub use cloudflare::CloudflareSource;
pub use coingecko::CoingeckoSource;
pub use coinmarketcap::CoinMarketCapSource;
pub use cryptocompare::CryptocompareSource;
pub use poloniex::{PoloniexSource, PricingStrategy, STEEM_USDT_STRATEGIES};

use serde_json::Value;

use steemfeed_core::{ConfigError, Exchange, FeedConfig, FetchStage, SourceError, SourceResult};

/// A fixed-URL quote endpoint with its own response schema
pub trait PriceSource: Send + Sync {
    fn exchange(&self) -> Exchange;

    fn url(&self) -> String;

    /// Pull the STEEM/USD(T) price out of a decoded response body
    fn extract_price(&self, body: &Value) -> SourceResult<f64>;
}

/// Build the enabled sources in polling order
pub fn sources_for(config: &FeedConfig) -> Result<Vec<Box<dyn PriceSource>>, ConfigError> {
    config
        .exchanges
        .iter()
        .map(|exchange| source_for(*exchange, config.api_key_for(*exchange)))
        .collect()
}

pub fn source_for(
    exchange: Exchange,
    api_key: Option<&str>,
) -> Result<Box<dyn PriceSource>, ConfigError> {
    let source: Box<dyn PriceSource> = match exchange {
        Exchange::Cloudflare => Box::new(CloudflareSource),
        Exchange::Coingecko => Box::new(CoingeckoSource),
        Exchange::Cryptocompare => Box::new(CryptocompareSource),
        Exchange::Coinmarketcap => {
            let key = api_key.ok_or(ConfigError::MissingApiKey(exchange))?;
            Box::new(CoinMarketCapSource::new(key)?)
        }
        Exchange::Binance => Box::new(BinanceSource),
        Exchange::Poloniex => Box::new(PoloniexSource::default()),
        Exchange::Bittrex => Box::new(BittrexSource),
    };
    Ok(source)
}

/// Read a JSON number or numeric string at `pointer`
pub(crate) fn number_at(exchange: Exchange, body: &Value, pointer: &str) -> SourceResult<f64> {
    let value = body
        .pointer(pointer)
        .ok_or_else(|| SourceError::missing_field(exchange, pointer))?;
    as_number(value).ok_or_else(|| {
        SourceError::new(
            exchange,
            FetchStage::Extract,
            format!("field {} is not numeric: {}", pointer, value),
        )
    })
}

pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reject zero, negative and non-finite prices
pub(crate) fn positive_price(exchange: Exchange, price: f64) -> SourceResult<f64> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(SourceError::new(
            exchange,
            FetchStage::Validate,
            format!("price {} is not positive", price),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_at_accepts_strings_and_numbers() {
        let body = json!({"a": "1.25", "b": 2.5, "c": true});
        assert_eq!(number_at(Exchange::Binance, &body, "/a").unwrap(), 1.25);
        assert_eq!(number_at(Exchange::Binance, &body, "/b").unwrap(), 2.5);

        let err = number_at(Exchange::Binance, &body, "/c").unwrap_err();
        assert_eq!(err.stage, FetchStage::Extract);

        let err = number_at(Exchange::Binance, &body, "/missing").unwrap_err();
        assert_eq!(err.stage, FetchStage::Extract);
        assert!(err.message.contains("/missing"));
    }

    #[test]
    fn test_positive_price() {
        assert!(positive_price(Exchange::Bittrex, 0.3).is_ok());
        assert_eq!(
            positive_price(Exchange::Bittrex, 0.0).unwrap_err().stage,
            FetchStage::Validate
        );
        assert!(positive_price(Exchange::Bittrex, f64::NAN).is_err());
    }

    #[test]
    fn test_sources_follow_config_order() {
        let config = FeedConfig::from_json_str(
            r#"{"feed_steem_account": "w", "exchanges": ["bittrex", "coinmarketcap", "cloudflare"],
                "coinmarketcap_api_key": "k"}"#,
            |_| None,
        )
        .unwrap();

        let exchanges: Vec<Exchange> = sources_for(&config)
            .unwrap()
            .iter()
            .map(|s| s.exchange())
            .collect();
        assert_eq!(
            exchanges,
            vec![Exchange::Cloudflare, Exchange::Coinmarketcap, Exchange::Bittrex]
        );
    }

    #[test]
    fn test_keyed_source_without_key() {
        assert!(matches!(
            source_for(Exchange::Coinmarketcap, None),
            Err(ConfigError::MissingApiKey(Exchange::Coinmarketcap))
        ));
    }
}
