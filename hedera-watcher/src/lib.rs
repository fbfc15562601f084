//! Hedera mirror-node poll loop (spec.md §4.5). Shares the checkpoint and
//! dispatch shape of `evm-watcher`, but the decoding step is a memo parse
//! plus a first-match-wins pick across a transaction's transfer lists
//! instead of an ABI event decode.

mod decode;
mod metrics;

use asset_registry::AssetRegistry;
use bridge_types::{ChainId, Reason, Topic};
use hedera_client::MirrorClient;
use message_queue::Bus;
use std::sync::Arc;
use std::time::Duration;
use transfer_store::{TransferStore, HEDERA_WATCHER_ID};

pub use decode::decode_transaction;

pub struct HederaWatcherConfig {
    pub bridge_account: String,
    pub polling_interval: Duration,
    pub validator_mode: bool,
}

pub struct HederaWatcher {
    config: HederaWatcherConfig,
    client: MirrorClient,
    registry: Arc<AssetRegistry>,
    store: TransferStore,
    bus: Arc<Bus>,
}

impl HederaWatcher {
    pub fn new(
        config: HederaWatcherConfig,
        client: MirrorClient,
        registry: Arc<AssetRegistry>,
        store: TransferStore,
        bus: Arc<Bus>,
    ) -> Self {
        HederaWatcher {
            config,
            client,
            registry,
            store,
            bus,
        }
    }

    async fn since(&self) -> Result<String, Reason> {
        Ok(self
            .store
            .get_watcher_status(HEDERA_WATCHER_ID)
            .await?
            .unwrap_or_else(|| "0.0".to_owned()))
    }

    pub async fn run(&self) -> Result<(), Reason> {
        loop {
            self.poll_once().await?;
            tokio::time::sleep(self.config.polling_interval).await;
        }
    }

    pub async fn poll_once(&self) -> Result<(), Reason> {
        let since = self.since().await?;
        let transactions = self
            .client
            .transactions_to(&self.config.bridge_account, &since)
            .await?;

        let mut latest_seen = since.clone();
        for tx in &transactions {
            if let Some((topic, intent)) =
                decode_transaction(&self.registry, &self.config.bridge_account, tx)
            {
                let topic = if self.config.validator_mode {
                    topic
                } else {
                    Topic::ReadOnlyTransferSave
                };
                self.bus
                    .push(topic, message_queue::Message::Transfer(intent))
                    .await
                    .map_err(|_| Reason::DbUnavailable("message bus closed".into()))?;
                metrics::record_ingested(ChainId::HEDERA.0);
            }
            latest_seen = tx.consensus_timestamp.clone();
        }

        if latest_seen != since {
            self.store
                .set_watcher_status(HEDERA_WATCHER_ID, &latest_seen)
                .await?;
        }
        Ok(())
    }
}
