//! CLI surface: a config file path plus a small `KEY=VALUE` override
//! mechanism, generalized from `node/src/cli.rs`'s `GatewayCmd::env` (there
//! restricted to four substrate-node settings; here it overrides the
//! handful of values an operator would rather pass at start-up than commit
//! to the config file — database credentials and key material).

use std::collections::HashMap;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "validator-node", about = "Cross-chain bridge validator node")]
pub struct Cli {
    /// Path to the node's TOML configuration file.
    #[structopt(short = "c", long = "config", default_value = "validator.toml")]
    pub config_path: String,

    #[structopt(short = "e", long = "env", help = "override a config value: KEY=VALUE")]
    /// Recognised keys: DATABASE_URL, KEY_ID, HEDERA_OPERATOR_KEY.
    ///
    /// example: validator-node --config validator.toml --env DATABASE_URL=postgres://... KEY_ID=validator-0
    pub env: Vec<String>,
}

impl Cli {
    pub fn parse_overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::with_capacity(self.env.len());
        for entry in &self.env {
            match entry.find('=') {
                Some(i) if i > 0 && i + 1 < entry.len() => {
                    let (key, value) = entry.split_at(i);
                    overrides.insert(key.to_owned(), value[1..].to_owned());
                }
                _ => panic!(
                    "the value `{}` supplied via --env should be a non-empty key and value separated by `=`",
                    entry
                ),
            }
        }
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value_overrides() {
        let cli = Cli {
            config_path: "validator.toml".into(),
            env: vec!["DATABASE_URL=postgres://localhost/bridge".into(), "KEY_ID=validator-0".into()],
        };
        let mut overrides = cli.parse_overrides();
        assert_eq!(overrides.remove("DATABASE_URL"), Some("postgres://localhost/bridge".into()));
        assert_eq!(overrides.remove("KEY_ID"), Some("validator-0".into()));
    }

    #[test]
    #[should_panic(expected = "non-empty key and value")]
    fn rejects_an_entry_with_no_separator() {
        let cli = Cli {
            config_path: "validator.toml".into(),
            env: vec!["NOT_A_MAPPING".into()],
        };
        cli.parse_overrides();
    }
}
