//! Hedera mirror-node REST client. The original's `MirrorTransaction`
//! carries all three transfer lists (NFT, fungible token, HBAR) on a single
//! transaction at once, even though only one of them "wins" for bridge
//! purposes — kept here so downstream consumers can see the full picture.

use bridge_types::Reason;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct NftTransfer {
    pub token_id: String,
    pub serial_number: u64,
    pub receiver_account_id: String,
    pub sender_account_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TokenTransfer {
    pub token_id: String,
    pub account: String,
    pub amount: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct HbarTransfer {
    pub account: String,
    pub amount: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MirrorTransaction {
    pub transaction_id: String,
    pub consensus_timestamp: String,
    #[serde(default)]
    pub memo_base64: String,
    #[serde(default)]
    pub nft_transfers: Vec<NftTransfer>,
    #[serde(default)]
    pub token_transfers: Vec<TokenTransfer>,
    #[serde(default)]
    pub transfers: Vec<HbarTransfer>,
}

/// The winning incoming transfer to the bridge account, selected by the
/// priority rule NFT > fungible token > HBAR (first match wins).
#[derive(Clone, Debug, PartialEq)]
pub enum IncomingTransfer {
    Nft { token_id: String, serial_number: u64 },
    Token { token_id: String, amount: u64 },
    Hbar { amount: u64 },
}

impl MirrorTransaction {
    pub fn incoming_transfer(&self, bridge_account: &str) -> Option<IncomingTransfer> {
        if let Some(nft) = self
            .nft_transfers
            .iter()
            .find(|t| t.receiver_account_id == bridge_account)
        {
            return Some(IncomingTransfer::Nft {
                token_id: nft.token_id.clone(),
                serial_number: nft.serial_number,
            });
        }
        if let Some(token) = self
            .token_transfers
            .iter()
            .find(|t| t.account == bridge_account && t.amount > 0)
        {
            return Some(IncomingTransfer::Token {
                token_id: token.token_id.clone(),
                amount: token.amount as u64,
            });
        }
        if let Some(hbar) = self
            .transfers
            .iter()
            .find(|t| t.account == bridge_account && t.amount > 0)
        {
            return Some(IncomingTransfer::Hbar {
                amount: hbar.amount as u64,
            });
        }
        None
    }
}

#[derive(Deserialize)]
struct TransactionsResponse {
    transactions: Vec<MirrorTransaction>,
}

pub struct MirrorClient {
    http: reqwest::Client,
    base_url: String,
}

impl MirrorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        MirrorClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Lists transactions crediting `account_id`, strictly after
    /// `since_consensus_timestamp`, consensus-timestamp ascending.
    pub async fn transactions_to(
        &self,
        account_id: &str,
        since_consensus_timestamp: &str,
    ) -> Result<Vec<MirrorTransaction>, Reason> {
        let url = format!(
            "{}/api/v1/transactions?account.id={}&timestamp=gt:{}&order=asc",
            self.base_url, account_id, since_consensus_timestamp
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Reason::RpcUnavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Reason::RpcUnavailable(format!(
                "mirror node returned {}",
                response.status()
            )));
        }
        let parsed: TransactionsResponse = response
            .json()
            .await
            .map_err(|e| Reason::RpcUnavailable(e.to_string()))?;
        Ok(parsed.transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx_with(
        nft: Vec<NftTransfer>,
        token: Vec<TokenTransfer>,
        hbar: Vec<HbarTransfer>,
    ) -> MirrorTransaction {
        MirrorTransaction {
            transaction_id: "0.0.123456-1700000000-000000001".into(),
            consensus_timestamp: "1700000000.000000001".into(),
            memo_base64: String::new(),
            nft_transfers: nft,
            token_transfers: token,
            transfers: hbar,
        }
    }

    #[test]
    fn nft_transfer_wins_over_token_and_hbar() {
        let tx = tx_with(
            vec![NftTransfer {
                token_id: "0.0.1".into(),
                serial_number: 7,
                receiver_account_id: "0.0.999".into(),
                sender_account_id: None,
            }],
            vec![TokenTransfer {
                token_id: "0.0.2".into(),
                account: "0.0.999".into(),
                amount: 100,
            }],
            vec![HbarTransfer {
                account: "0.0.999".into(),
                amount: 50,
            }],
        );
        assert_eq!(
            tx.incoming_transfer("0.0.999"),
            Some(IncomingTransfer::Nft {
                token_id: "0.0.1".into(),
                serial_number: 7,
            })
        );
    }

    #[test]
    fn token_transfer_wins_over_hbar_when_no_nft() {
        let tx = tx_with(
            vec![],
            vec![TokenTransfer {
                token_id: "0.0.2".into(),
                account: "0.0.999".into(),
                amount: 100,
            }],
            vec![HbarTransfer {
                account: "0.0.999".into(),
                amount: 50,
            }],
        );
        assert_eq!(
            tx.incoming_transfer("0.0.999"),
            Some(IncomingTransfer::Token {
                token_id: "0.0.2".into(),
                amount: 100,
            })
        );
    }

    #[test]
    fn no_matching_transfer_returns_none() {
        let tx = tx_with(vec![], vec![], vec![]);
        assert_eq!(tx.incoming_transfer("0.0.999"), None);
    }
}
