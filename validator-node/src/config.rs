//! Node configuration: a TOML file deserialised with `serde`, plus the
//! handful of `--env KEY=VALUE` overrides `cli::Cli` accepts. Exact
//! YAML/env parsing is out of scope; this is the minimal struct + loader
//! the rest of the node is wired against.

use bridge_types::{AssetMapping, ChainId, Reason};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct EvmChainConfig {
    pub chain_id: u64,
    pub rpc_url: String,
    pub router_address: String,
    pub start_block: u64,
    #[serde(default = "default_block_confirmations")]
    pub block_confirmations: u64,
    #[serde(default = "default_polling_interval_secs")]
    pub polling_interval_secs: u64,
    #[serde(default = "default_max_logs_blocks")]
    pub max_logs_blocks: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HederaConfig {
    pub mirror_base_url: String,
    pub bridge_account: String,
    #[serde(default = "default_polling_interval_secs")]
    pub polling_interval_secs: u64,
    /// One of "mainnet", "testnet", "previewnet".
    #[serde(default = "default_hedera_network")]
    pub network: String,
    pub operator_account: String,
    #[serde(default)]
    pub operator_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdConfig {
    pub percentage: u64,
    pub precision: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeeConfig {
    /// Basis points (1/100 of a percent) charged on a Hedera-native
    /// fungible transfer.
    pub percentage_bps: u32,
    /// Flat HBAR fee charged on a Hedera-native NFT transfer.
    pub flat_nft_fee: Decimal,
    /// Accounts the collected fee is split across.
    pub fee_members: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberEntry {
    pub chain_id: u64,
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    #[serde(default)]
    pub validator_mode: bool,
    #[serde(default = "default_key_id")]
    pub key_id: String,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    pub evm_chains: Vec<EvmChainConfig>,
    pub hedera: HederaConfig,
    pub asset_mappings: Vec<AssetMapping>,
    pub members: Vec<MemberEntry>,
    pub threshold: ThresholdConfig,
    pub fee: FeeConfig,
}

fn default_block_confirmations() -> u64 {
    12
}

fn default_polling_interval_secs() -> u64 {
    15
}

fn default_max_logs_blocks() -> u64 {
    2_000
}

fn default_hedera_network() -> String {
    "testnet".to_owned()
}

fn default_key_id() -> String {
    "my_eth_key_id".to_owned()
}

fn default_channel_capacity() -> usize {
    256
}

impl Config {
    pub fn load(path: &Path, overrides: &HashMap<String, String>) -> Result<Config, Reason> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Reason::BadConfig(format!("reading {}: {}", path.display(), e)))?;
        let mut config: Config =
            toml::from_str(&raw).map_err(|e| Reason::BadConfig(format!("parsing {}: {}", path.display(), e)))?;

        if let Some(v) = overrides.get("DATABASE_URL") {
            config.database_url = v.clone();
        }
        if let Some(v) = overrides.get("KEY_ID") {
            config.key_id = v.clone();
        }
        if let Some(v) = overrides.get("HEDERA_OPERATOR_KEY") {
            config.hedera.operator_key = v.clone();
        }

        config.validate()
    }

    fn validate(self) -> Result<Config, Reason> {
        if self.threshold.precision == 0 {
            return Err(Reason::ZeroPrecision);
        }
        if self.hedera.operator_key.is_empty() {
            return Err(Reason::BadConfig("hedera.operator_key is required".into()));
        }
        Ok(self)
    }

    pub fn member_rows(&self) -> Vec<(ChainId, String)> {
        self.members.iter().map(|m| (ChainId(m.chain_id), m.address.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        database_url = "postgres://localhost/bridge"

        [hedera]
        mirror_base_url = "https://testnet.mirrornode.hedera.com"
        bridge_account = "0.0.9000"
        operator_account = "0.0.9001"
        operator_key = "302e..."

        [[evm_chains]]
        chain_id = 1
        rpc_url = "https://rpc.example"
        router_address = "0xabc"
        start_block = 100

        [[asset_mappings]]
        chain_id = 0
        address = "HBAR"
        opposite_chain_id = 1
        opposite_address = "0xdead"
        decimals = 8
        opposite_decimals = 18

        [[members]]
        chain_id = 1
        address = "0x1111"

        [threshold]
        percentage = 51
        precision = 100

        [fee]
        percentage_bps = 100
        flat_nft_fee = "2"
        fee_members = ["0.0.1", "0.0.2"]
    "#;

    #[test]
    fn loads_defaults_for_optional_fields() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.key_id, "my_eth_key_id");
        assert_eq!(config.channel_capacity, 256);
        assert_eq!(config.hedera.network, "testnet");
        assert_eq!(config.evm_chains[0].block_confirmations, 12);
    }

    #[test]
    fn env_override_replaces_the_database_url() {
        let dir = std::env::temp_dir().join("validator-node-config-test.toml");
        std::fs::write(&dir, SAMPLE).unwrap();
        let mut overrides = HashMap::new();
        overrides.insert("DATABASE_URL".to_owned(), "postgres://override/bridge".to_owned());
        let config = Config::load(&dir, &overrides).unwrap();
        assert_eq!(config.database_url, "postgres://override/bridge");
        std::fs::remove_file(&dir).ok();
    }

    #[test]
    fn zero_precision_threshold_is_rejected_at_load() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.threshold.precision = 0;
        assert_eq!(config.validate().unwrap_err(), Reason::ZeroPrecision);
    }
}
