//! Core type definitions

use std::fmt;
use std::str::FromStr;

/// Supported price-quote providers
///
/// Declaration order is the polling order used by the feed loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Exchange {
    Cloudflare,
    Coingecko,
    Cryptocompare,
    Coinmarketcap,
    Binance,
    Poloniex,
    Bittrex,
}

impl Exchange {
    pub const ALL: [Exchange; 7] = [
        Exchange::Cloudflare,
        Exchange::Coingecko,
        Exchange::Cryptocompare,
        Exchange::Coinmarketcap,
        Exchange::Binance,
        Exchange::Poloniex,
        Exchange::Bittrex,
    ];

    /// Config-file spelling
    pub fn name(&self) -> &'static str {
        match self {
            Exchange::Cloudflare => "cloudflare",
            Exchange::Coingecko => "coingecko",
            Exchange::Cryptocompare => "cryptocompare",
            Exchange::Coinmarketcap => "coinmarketcap",
            Exchange::Binance => "binance",
            Exchange::Poloniex => "poloniex",
            Exchange::Bittrex => "bittrex",
        }
    }

    /// Human-readable label used in log lines
    pub fn label(&self) -> &'static str {
        match self {
            Exchange::Cloudflare => "Cloudflare",
            Exchange::Coingecko => "Coingecko",
            Exchange::Cryptocompare => "Cryptocompare",
            Exchange::Coinmarketcap => "CoinMarketCap",
            Exchange::Binance => "Binance",
            Exchange::Poloniex => "Poloniex",
            Exchange::Bittrex => "Bittrex",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, Exchange::Coinmarketcap)
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Exchange::ALL
            .into_iter()
            .find(|e| e.name() == wanted)
            .ok_or_else(|| format!("unknown exchange: {}", s))
    }
}

/// Round to three decimals on the exact binary value.
///
/// Scaling by 1000 first would turn 0.2455 (stored as 0.24549999...) into
/// an exact 245.5 tie; formatting rounds the true expansion instead.
pub fn round3(value: f64) -> f64 {
    format!("{:.3}", value).parse().unwrap_or(value)
}

/// Base/quote pair submitted with a witness feed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeRate {
    pub base: f64,
    pub quote: f64,
}

impl ExchangeRate {
    /// `base = round(price, 3)`, `quote = round(1 / peg_multi, 3)`
    pub fn from_price(price: f64, peg_multi: f64) -> Self {
        Self {
            base: round3(price),
            quote: round3(1.0 / peg_multi),
        }
    }

    /// Base in thousandths, as carried on chain
    pub fn base_milli(&self) -> i64 {
        (self.base * 1000.0).round() as i64
    }

    pub fn quote_milli(&self) -> i64 {
        (self.quote * 1000.0).round() as i64
    }

    pub fn base_asset(&self) -> String {
        format!("{:.3} SBD", self.base)
    }

    pub fn quote_asset(&self) -> String {
        format!("{:.3} STEEM", self.quote)
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{base: {}, quote: {}}}", self.base_asset(), self.quote_asset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_rate_rounding() {
        let rate = ExchangeRate::from_price(0.2456, 1.0);
        assert_eq!(rate.base, 0.246);
        assert_eq!(rate.quote, 1.0);
        assert_eq!(rate.base_asset(), "0.246 SBD");
        assert_eq!(rate.quote_asset(), "1.000 STEEM");
    }

    #[test]
    fn test_rounding_follows_stored_value() {
        assert_eq!(ExchangeRate::from_price(0.2455, 1.0).base, 0.245);
        assert_eq!(ExchangeRate::from_price(0.2475, 1.0).base, 0.247);
        assert_eq!(ExchangeRate::from_price(0.0015, 1.0).base, 0.002);
        assert_eq!(round3(1.0005), 1.0);
        assert_eq!(round3(2.675), 2.675);
    }

    #[test]
    fn test_exchange_rate_peg() {
        let rate = ExchangeRate::from_price(1.0, 3.0);
        assert_eq!(rate.quote, 0.333);
        assert_eq!(rate.quote_milli(), 333);
        assert_eq!(rate.base_milli(), 1000);
    }

    #[test]
    fn test_exchange_parsing() {
        assert_eq!("binance".parse::<Exchange>(), Ok(Exchange::Binance));
        assert_eq!(" CoinMarketCap ".parse::<Exchange>(), Ok(Exchange::Coinmarketcap));
        assert!("kraken".parse::<Exchange>().is_err());
    }

    #[test]
    fn test_polling_order() {
        let mut shuffled = vec![Exchange::Bittrex, Exchange::Cloudflare, Exchange::Poloniex];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Exchange::Cloudflare, Exchange::Poloniex, Exchange::Bittrex]
        );
        assert!(Exchange::Coinmarketcap.requires_api_key());
        assert!(!Exchange::Coingecko.requires_api_key());
    }
}
