//! feed_publish transaction building, serialization and signing
//!
//! Serialization follows the chain's binary wire format: little-endian
//! integers, LEB128 lengths, and legacy assets (i64 amount, u8 precision,
//! 7-byte zero-padded symbol).

use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime, Utc};
use k256::ecdsa::SigningKey;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use steemfeed_core::{ExchangeRate, PublishError, PublishResult};

/// Mainnet chain id
pub const STEEM_CHAIN_ID: [u8; 32] = [0u8; 32];
pub const FEED_PUBLISH_OPERATION_ID: u64 = 7;
pub const TRANSACTION_EXPIRATION_SECS: i64 = 60;
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const WIF_VERSION: u8 = 0x80;
const ASSET_PRECISION: u8 = 3;

/// Legacy fixed-precision asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub amount: i64,
    pub precision: u8,
    pub symbol: &'static str,
}

impl Asset {
    pub fn sbd(milli: i64) -> Self {
        Self {
            amount: milli,
            precision: ASSET_PRECISION,
            symbol: "SBD",
        }
    }

    pub fn steem(milli: i64) -> Self {
        Self {
            amount: milli,
            precision: ASSET_PRECISION,
            symbol: "STEEM",
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.amount.to_le_bytes());
        out.push(self.precision);
        let mut symbol = [0u8; 7];
        symbol[..self.symbol.len()].copy_from_slice(self.symbol.as_bytes());
        out.extend_from_slice(&symbol);
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scale = 10i64.pow(self.precision as u32);
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        write!(
            f,
            "{}{}.{:0width$} {}",
            sign,
            abs / scale as u64,
            abs % scale as u64,
            self.symbol,
            width = self.precision as usize
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPublishOperation {
    pub publisher: String,
    pub base: Asset,
    pub quote: Asset,
}

impl FeedPublishOperation {
    pub fn new(publisher: &str, rate: &ExchangeRate) -> Self {
        Self {
            publisher: publisher.to_string(),
            base: Asset::sbd(rate.base_milli()),
            quote: Asset::steem(rate.quote_milli()),
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        write_varint(out, FEED_PUBLISH_OPERATION_ID);
        write_string(out, &self.publisher);
        self.base.write(out);
        self.quote.write(out);
    }

    fn to_json(&self) -> Value {
        json!([
            "feed_publish",
            {
                "publisher": self.publisher,
                "exchange_rate": {
                    "base": self.base.to_string(),
                    "quote": self.quote.to_string(),
                }
            }
        ])
    }
}

/// Head block fields needed for TaPoS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadBlock {
    pub number: u32,
    pub id: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct DynamicGlobalProperties {
    head_block_number: u32,
    head_block_id: String,
    time: String,
}

impl HeadBlock {
    /// Parse a `get_dynamic_global_properties` result
    pub fn from_properties(value: Value) -> Result<Self, String> {
        let props: DynamicGlobalProperties =
            serde_json::from_value(value).map_err(|e| e.to_string())?;
        let time = NaiveDateTime::parse_from_str(&props.time, TIME_FORMAT)
            .map_err(|e| format!("bad head block time {}: {}", props.time, e))?
            .and_utc();
        Ok(Self {
            number: props.head_block_number,
            id: props.head_block_id,
            time,
        })
    }

    pub fn ref_block_num(&self) -> u16 {
        (self.number & 0xffff) as u16
    }

    /// Little-endian u32 at bytes 4..8 of the block id
    pub fn ref_block_prefix(&self) -> Result<u32, String> {
        let bytes = hex::decode(&self.id).map_err(|e| format!("bad head block id: {}", e))?;
        let prefix: [u8; 4] = bytes
            .get(4..8)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| format!("head block id too short: {}", self.id))?;
        Ok(u32::from_le_bytes(prefix))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
    pub expiration: DateTime<Utc>,
    pub operation: FeedPublishOperation,
}

impl Transaction {
    pub fn new(head: &HeadBlock, operation: FeedPublishOperation) -> Result<Self, String> {
        Ok(Self {
            ref_block_num: head.ref_block_num(),
            ref_block_prefix: head.ref_block_prefix()?,
            expiration: head.time + ChronoDuration::seconds(TRANSACTION_EXPIRATION_SECS),
            operation,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64);
        out.extend_from_slice(&self.ref_block_num.to_le_bytes());
        out.extend_from_slice(&self.ref_block_prefix.to_le_bytes());
        out.extend_from_slice(&(self.expiration.timestamp() as u32).to_le_bytes());
        write_varint(&mut out, 1);
        self.operation.write(&mut out);
        // extensions
        write_varint(&mut out, 0);
        out
    }

    pub fn digest(&self, chain_id: &[u8; 32]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(chain_id);
        hasher.update(self.to_bytes());
        hasher.finalize().into()
    }

    pub fn to_json(&self, signatures: &[String]) -> Value {
        json!({
            "ref_block_num": self.ref_block_num,
            "ref_block_prefix": self.ref_block_prefix,
            "expiration": self.expiration.format(TIME_FORMAT).to_string(),
            "operations": [self.operation.to_json()],
            "extensions": [],
            "signatures": signatures,
        })
    }
}

/// WIF-encoded active key
pub struct ActiveKey {
    key: SigningKey,
}

impl ActiveKey {
    pub fn from_wif(wif: &str) -> PublishResult<Self> {
        let bytes = bs58::decode(wif.trim())
            .into_vec()
            .map_err(|e| PublishError::InvalidKey(e.to_string()))?;
        if bytes.len() != 37 || bytes[0] != WIF_VERSION {
            return Err(PublishError::InvalidKey("not a WIF private key".to_string()));
        }

        let (payload, checksum) = bytes.split_at(33);
        let hash = Sha256::digest(Sha256::digest(payload));
        if &hash[..4] != checksum {
            return Err(PublishError::InvalidKey("checksum mismatch".to_string()));
        }

        let key = SigningKey::from_slice(&payload[1..])
            .map_err(|e| PublishError::InvalidKey(e.to_string()))?;
        Ok(Self { key })
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.key
    }

    /// 65-byte compact signature: recovery byte then r and s
    pub fn sign_compact(&self, digest: &[u8; 32]) -> PublishResult<[u8; 65]> {
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(digest)
            .map_err(|e| PublishError::Signing(e.to_string()))?;

        let mut compact = [0u8; 65];
        compact[0] = recovery_id.to_byte() + 27 + 4;
        compact[1..].copy_from_slice(&signature.to_bytes());
        Ok(compact)
    }
}

impl std::fmt::Debug for ActiveKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ActiveKey(..)")
    }
}

/// The chain rejects signatures whose r or s carry a high bit or a
/// redundant leading zero.
pub fn is_canonical(sig: &[u8; 65]) -> bool {
    sig[1] & 0x80 == 0
        && !(sig[1] == 0 && sig[2] & 0x80 == 0)
        && sig[33] & 0x80 == 0
        && !(sig[33] == 0 && sig[34] & 0x80 == 0)
}

/// Sign, nudging expiration forward a second until the signature is canonical
pub fn sign_transaction(
    mut tx: Transaction,
    key: &ActiveKey,
    chain_id: &[u8; 32],
    max_attempts: u32,
) -> PublishResult<(Transaction, String)> {
    for _ in 0..max_attempts {
        let signature = key.sign_compact(&tx.digest(chain_id))?;
        if is_canonical(&signature) {
            return Ok((tx, hex::encode(signature)));
        }
        tx.expiration += ChronoDuration::seconds(1);
    }
    Err(PublishError::Signing(format!(
        "no canonical signature after {} attempts",
        max_attempts
    )))
}

fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    write_varint(out, s.len() as u64);
    out.extend_from_slice(s.as_bytes());
}
