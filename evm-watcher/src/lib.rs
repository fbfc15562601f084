//! EVM router poll loop. Grounded on the checkpoint/fetch/dispatch shape of
//! the teacher's `internal::events::process_events`: read a durable
//! checkpoint, fetch a bounded range of events, dispatch each, and only
//! advance the checkpoint once every dispatch succeeded.

mod handlers;
mod metrics;

use asset_registry::AssetRegistry;
use bridge_types::{ChainId, Reason};
use evm_client::EvmClient;
use message_queue::Bus;
use std::sync::Arc;
use std::time::Duration;
use transfer_store::TransferStore;

pub use handlers::handle_event;

pub struct EvmWatcherConfig {
    pub chain_id: ChainId,
    pub router_address: String,
    pub start_block: u64,
    pub block_confirmations: u64,
    pub polling_interval: Duration,
    pub max_logs_blocks: u64,
    /// Validator nodes submit to the consensus topic; read-only nodes only
    /// mirror into the read-only topics (no signing).
    pub validator_mode: bool,
}

pub struct EvmWatcher {
    config: EvmWatcherConfig,
    client: EvmClient,
    registry: Arc<AssetRegistry>,
    store: TransferStore,
    bus: Arc<Bus>,
}

impl EvmWatcher {
    pub fn new(
        config: EvmWatcherConfig,
        client: EvmClient,
        registry: Arc<AssetRegistry>,
        store: TransferStore,
        bus: Arc<Bus>,
    ) -> Self {
        EvmWatcher {
            config,
            client,
            registry,
            store,
            bus,
        }
    }

    fn watcher_id(&self) -> String {
        transfer_store::watcher_id_for_evm(self.config.chain_id, &self.config.router_address)
    }

    async fn last_processed(&self) -> Result<u64, Reason> {
        match self.store.get_watcher_status(&self.watcher_id()).await? {
            Some(raw) => raw.parse().map_err(|_| Reason::BadConfig(raw)),
            None => Ok(self.config.start_block.saturating_sub(1)),
        }
    }

    /// Runs the poll loop forever. Intended to be driven by a `tokio::spawn`
    /// in the node binary; returns only on an unrecoverable store error.
    pub async fn run(&self) -> Result<(), Reason> {
        loop {
            self.poll_once().await?;
            tokio::time::sleep(self.config.polling_interval).await;
        }
    }

    /// One iteration of the poll/fetch/dispatch/checkpoint cycle. Split out
    /// from `run` so tests can drive it without sleeping.
    pub async fn poll_once(&self) -> Result<(), Reason> {
        let head = self
            .client
            .fetch_latest_block()
            .await
            .map_err(|e| Reason::RpcUnavailable(e.to_string()))?;
        let target = head.saturating_sub(self.config.block_confirmations);
        let last_processed = self.last_processed().await?;

        if target <= last_processed {
            return Ok(());
        }

        let from_block = last_processed + 1;
        let to_block = std::cmp::min(last_processed + self.config.max_logs_blocks, target);

        let logs = self
            .client
            .fetch_logs(&self.config.router_address, from_block, to_block)
            .await
            .map_err(|e| Reason::RpcUnavailable(e.to_string()))?;

        for log in &logs {
            if log.removed {
                log::info!("skipping re-orged log {}", log.transaction_hash);
                continue;
            }
            match handle_event(&self.registry, self.config.chain_id, log) {
                Ok(Some((topic, intent))) => {
                    let topic = handlers::resolve_topic(topic, self.config.validator_mode);
                    self.bus
                        .push(topic, message_queue::Message::Transfer(intent))
                        .await
                        .map_err(|_| Reason::DbUnavailable("message bus closed".into()))?;
                    metrics::record_ingested(self.config.chain_id.0);
                }
                Ok(None) => {
                    // MemberUpdated: forwarded as a distinct message kind, not a transfer.
                    if let evm_client::RouterEvent::MemberUpdated { .. } = &log.event {
                        self.bus
                            .push(
                                bridge_types::Topic::TopicMessageSubmission,
                                message_queue::Message::MemberUpdated {
                                    chain_id: self.config.chain_id,
                                },
                            )
                            .await
                            .map_err(|_| Reason::DbUnavailable("message bus closed".into()))?;
                    }
                }
                Err(reason) => {
                    log::warn!(
                        "rejecting log {} on chain {}: {:?}",
                        log.transaction_hash,
                        self.config.chain_id,
                        reason
                    );
                }
            }
        }

        self.store
            .set_watcher_status(&self.watcher_id(), &to_block.to_string())
            .await?;
        Ok(())
    }
}
