//! JSON-RPC client over an EVM node: `eth_getLogs`/`eth_blockNumber`, plus
//! bridge event decoding. The teacher's `sp_runtime::offchain::http` client
//! only runs inside a substrate offchain worker; this client uses `reqwest`
//! since the node here is a plain async binary (`other_examples`'s
//! `ethers`-based watchers confirm this is the idiomatic swap).

pub mod events;

pub use events::{decode_event, EventError, RouterEvent};

use serde::Deserialize;
use std::convert::TryInto;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EvmClientError {
    Http(String),
    HttpStatus(u16),
    JsonParse,
    MissingResult,
}

impl std::fmt::Display for EvmClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for EvmClientError {}

#[derive(Deserialize, Debug)]
struct ResponseError {
    #[allow(dead_code)]
    message: Option<String>,
    #[allow(dead_code)]
    code: Option<i64>,
}

#[derive(Deserialize, Debug)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<ResponseError>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LogObject {
    pub removed: Option<bool>,
    pub log_index: Option<String>,
    pub transaction_index: Option<String>,
    pub transaction_hash: Option<String>,
    pub block_hash: Option<String>,
    pub block_number: Option<String>,
    pub address: Option<String>,
    pub data: Option<String>,
    pub topics: Option<Vec<String>>,
}

/// A decoded EVM log, ready for the watcher to dispatch by event variant.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedLog {
    pub removed: bool,
    pub block_number: u64,
    pub log_index: u64,
    pub transaction_hash: String,
    pub event: RouterEvent,
}

pub struct EvmClient {
    http: reqwest::Client,
    rpc_url: String,
}

impl EvmClient {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        EvmClient {
            http: reqwest::Client::new(),
            rpc_url: rpc_url.into(),
        }
    }

    async fn send_rpc<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, EvmClientError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1,
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EvmClientError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EvmClientError::HttpStatus(response.status().as_u16()));
        }

        let parsed: RpcResponse<T> = response
            .json()
            .await
            .map_err(|_| EvmClientError::JsonParse)?;

        parsed.result.ok_or(EvmClientError::MissingResult)
    }

    /// Fetches and decodes logs for `router_address` within `[from_block,
    /// to_block]`, filtered to the six bridge event topics. Logs that fail
    /// to decode are skipped, never errored — matching the watcher's
    /// "on decode failure, skip and continue" contract.
    pub async fn fetch_logs(
        &self,
        router_address: &str,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<DecodedLog>, EvmClientError> {
        let params = serde_json::json!([{
            "address": router_address,
            "fromBlock": format!("0x{:x}", from_block),
            "toBlock": format!("0x{:x}", to_block),
        }]);

        let logs: Vec<LogObject> = self.send_rpc("eth_getLogs", params).await?;

        Ok(logs
            .into_iter()
            .filter_map(|log| {
                let removed = log.removed.unwrap_or(false);
                let block_number = parse_hex_u64(log.block_number.as_deref())?;
                let log_index = parse_hex_u64(log.log_index.as_deref())?;
                let tx_hash = log.transaction_hash?;
                let data = log.data?;
                let topics = log.topics?;
                match decode_event(&topics, &data) {
                    Ok(event) => Some(DecodedLog {
                        removed,
                        block_number,
                        log_index,
                        transaction_hash: tx_hash,
                        event,
                    }),
                    Err(err) => {
                        log::warn!("skipping log {}: failed to decode ({:?})", tx_hash, err);
                        None
                    }
                }
            })
            .collect())
    }

    pub async fn fetch_latest_block(&self) -> Result<u64, EvmClientError> {
        let result: String = self
            .send_rpc("eth_blockNumber", serde_json::json!([]))
            .await?;
        parse_hex_u64(Some(&result)).ok_or(EvmClientError::JsonParse)
    }
}

fn parse_hex_u64(value: Option<&str>) -> Option<u64> {
    let value = value?.strip_prefix("0x")?;
    u64::from_str_radix(value, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_block_number() {
        assert_eq!(parse_hex_u64(Some("0x5c29fb")), Some(0x5c29fb));
        assert_eq!(parse_hex_u64(Some("not-hex")), None);
        assert_eq!(parse_hex_u64(None), None);
    }

    #[test]
    fn deserializes_get_logs_response_happy_path() {
        const RESPONSE: &str = r#"{
            "jsonrpc": "2.0",
            "id": 1,
            "result": [
                {
                    "address": "0x1a94fce7ef36bc90959e206ba569a12afbc91ca1",
                    "blockHash": "0x7c5a35e9cb3e8ae0e221ab470abae9d446c3a5626ce6689fc777dcffcab52c70",
                    "blockNumber": "0x5c29fb",
                    "data": "0x00",
                    "logIndex": "0x1d",
                    "removed": false,
                    "topics": ["0x00"],
                    "transactionHash": "0x3dc91b98249fa9f2c5c37486a2427a3a7825be240c1c84961dfb3063d9c04d50",
                    "transactionIndex": "0x1d"
                }
            ]
        }"#;
        let parsed: RpcResponse<Vec<LogObject>> = serde_json::from_str(RESPONSE).unwrap();
        assert!(parsed.error.is_none());
        assert_eq!(parsed.result.unwrap().len(), 1);
    }

    #[test]
    fn deserializes_get_logs_response_error_path() {
        const RESPONSE: &str = r#"{
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32005, "message": "query returned more than 10000 results"}
        }"#;
        let parsed: RpcResponse<Vec<LogObject>> = serde_json::from_str(RESPONSE).unwrap();
        assert!(parsed.result.is_none());
        assert!(parsed.error.is_some());
    }
}
