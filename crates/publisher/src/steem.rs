//! Steem JSON-RPC client
//!
//! Nodes are tried in configured order. A transport failure moves on to the
//! next node; an error returned by a node is final for that call.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use steemfeed_core::{ExchangeRate, PublishError, PublishResult};

use crate::client::WitnessClient;
use crate::transaction::{
    sign_transaction, ActiveKey, FeedPublishOperation, HeadBlock, Transaction, STEEM_CHAIN_ID,
};

pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_SIGNING_ATTEMPTS: u32 = 100;

pub struct SteemClient {
    http: reqwest::Client,
    nodes: Vec<String>,
    key: Option<ActiveKey>,
    request_id: AtomicU64,
}

impl SteemClient {
    /// `active_key` of `None` gives a read-only client
    pub fn new(nodes: Vec<String>, active_key: Option<&str>, timeout: Duration) -> PublishResult<Self> {
        if nodes.is_empty() {
            return Err(PublishError::NoNodes);
        }
        let key = active_key.map(ActiveKey::from_wif).transpose()?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PublishError::Transport {
                node: nodes[0].clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            nodes,
            key,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn is_read_only(&self) -> bool {
        self.key.is_none()
    }

    /// Call `method` on the first node that answers
    pub async fn call(&self, method: &str, params: Value) -> PublishResult<Value> {
        self.call_any(method, params).await.map(|(_, result)| result)
    }

    /// Like `call`, also naming the node that answered
    async fn call_any(&self, method: &str, params: Value) -> PublishResult<(&str, Value)> {
        let mut last_error = PublishError::NoNodes;

        for node in &self.nodes {
            match self.call_node(node, method, &params).await {
                Ok(result) => return Ok((node.as_str(), result)),
                Err(e @ PublishError::Transport { .. }) => {
                    warn!(node = %node, method, error = %e, "rpc node unreachable, trying next");
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }

    async fn call_node(&self, node: &str, method: &str, params: &Value) -> PublishResult<Value> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        debug!(node, method, id, "rpc call");

        let transport = |e: reqwest::Error| PublishError::Transport {
            node: node.to_string(),
            message: e.to_string(),
        };

        let response = self
            .http
            .post(node)
            .json(&request)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(PublishError::Transport {
                node: node.to_string(),
                message: format!("http status {}", response.status()),
            });
        }

        let body: Value = response.json().await.map_err(transport)?;

        if let Some(error) = body.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(PublishError::Rpc {
                node: node.to_string(),
                message,
            });
        }

        body.get("result").cloned().ok_or_else(|| PublishError::Rpc {
            node: node.to_string(),
            message: "response carries neither result nor error".to_string(),
        })
    }

    pub async fn head_block(&self) -> PublishResult<HeadBlock> {
        self.head_block_from_any().await.map(|(_, head)| head)
    }

    async fn head_block_from_any(&self) -> PublishResult<(&str, HeadBlock)> {
        let (node, props) = self
            .call_any("condenser_api.get_dynamic_global_properties", json!([]))
            .await?;
        let head = HeadBlock::from_properties(props).map_err(|message| PublishError::Rpc {
            node: node.to_string(),
            message,
        })?;
        Ok((node, head))
    }
}

#[async_trait]
impl WitnessClient for SteemClient {
    async fn publish_feed(&self, rate: &ExchangeRate, account: &str) -> PublishResult<()> {
        let key = self.key.as_ref().ok_or(PublishError::MissingActiveKey)?;

        let (node, head) = self.head_block_from_any().await?;
        let operation = FeedPublishOperation::new(account, rate);
        let tx = Transaction::new(&head, operation).map_err(|message| PublishError::Rpc {
            node: node.to_string(),
            message,
        })?;
        let (tx, signature) = sign_transaction(tx, key, &STEEM_CHAIN_ID, MAX_SIGNING_ATTEMPTS)?;

        let result = self
            .call(
                "condenser_api.broadcast_transaction_synchronous",
                json!([tx.to_json(&[signature])]),
            )
            .await?;

        let block = result.get("block_num").and_then(Value::as_u64).unwrap_or_default();
        let trx_id = result.get("id").and_then(Value::as_str).unwrap_or_default();
        info!(account, block, trx_id, "feed_publish included");
        Ok(())
    }
}
