//! Wires the eight core components together into one running process.
//! Grounded on `node/src/service.rs`'s role as the crate that owns
//! construction of every long-lived service and hands the substrate task
//! manager a set of futures to drive; here the equivalent is a
//! `tokio::task::JoinSet` of watcher/service loops.

use crate::config::Config;
use asset_registry::AssetRegistry;
use bridge_types::{ChainId, Reason, Topic};
use hedera_client::{HieroScheduleClient, MirrorClient, ScheduleClient};
use hiero_sdk::{AccountId, Client, PrivateKey};
use message_queue::{Bus, Message, Subscription};
use message_service::{ConsensusTopic, LoopbackConsensusTopic, MessageService, StaticMemberRegistry};
use signature_aggregator::threshold::{StaticThresholdProvider, ThresholdParams};
use signature_aggregator::SignatureAggregator;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use transfer_service::fee::{EqualSplitFeeDistributor, FlatNftFeeService, PercentageFeeService};
use transfer_service::TransferService;
use transfer_store::TransferStore;
use validator_crypto::KeyId;

/// The topics a validator build actually signs against; the `ReadOnly*`
/// mirror topics are what a non-validator build publishes onto instead (see
/// `evm_watcher::handlers::resolve_topic`), and have no consumer here — a
/// read-only observer is the out-of-scope HTTP API's job, not this node's.
const LIVE_TRANSFER_TOPICS: [Topic; 4] = [
    Topic::TopicMessageSubmission,
    Topic::HederaMintHtsTransfer,
    Topic::HederaFeeTransfer,
    Topic::HederaNftTransfer,
];

fn build_hiero_client(network: &str) -> Result<Client, Reason> {
    match network {
        "mainnet" => Ok(Client::for_mainnet()),
        "testnet" => Ok(Client::for_testnet()),
        "previewnet" => Ok(Client::for_previewnet()),
        other => Err(Reason::BadConfig(format!("unknown hedera network {:?}", other))),
    }
}

/// Builds every component and runs the node until one of its supervised
/// tasks exits. A watcher's loop only returns on an unrecoverable store
/// error (`Reason`'s Fatal/Consistency classes); any single task finishing
/// is treated as a reason to shut the whole node down rather than limp on
/// half-wired.
pub async fn run(config: Config) -> Result<(), Reason> {
    let store = TransferStore::connect(&config.database_url).await?;
    store.run_migrations().await?;

    let registry = Arc::new(AssetRegistry::load(&config.asset_mappings));
    let (bus, mut subscriptions) = Bus::new(config.channel_capacity);
    let bus = Arc::new(bus);

    let keyring: Arc<dyn validator_crypto::Keyring> = Arc::from(validator_crypto::keyring());
    let key_id = KeyId::from(config.key_id.clone());
    let members: Arc<dyn message_service::MemberRegistry> =
        Arc::new(StaticMemberRegistry::new(config.member_rows()));
    let message_service = Arc::new(MessageService::new(store.clone(), keyring, key_id, members));

    let consensus_topic = Arc::new(LoopbackConsensusTopic::new(config.channel_capacity));
    let consensus_topic_dyn: Arc<dyn ConsensusTopic> = consensus_topic.clone();

    let hedera_operator: AccountId = config
        .hedera
        .operator_account
        .parse()
        .map_err(|_| Reason::BadConfig("hedera.operator_account".into()))?;
    let hedera_operator_key: PrivateKey = config
        .hedera
        .operator_key
        .parse()
        .map_err(|_| Reason::BadConfig("hedera.operator_key".into()))?;
    let hiero_client = build_hiero_client(&config.hedera.network)?;
    let schedule_client: Arc<dyn ScheduleClient> = Arc::new(HieroScheduleClient::new(
        hiero_client,
        hedera_operator,
        hedera_operator_key,
    ));

    let fee_service = Arc::new(PercentageFeeService::new(config.fee.percentage_bps));
    let nft_fee_service = Arc::new(FlatNftFeeService::new(HashMap::new(), config.fee.flat_nft_fee));
    let distributor = Arc::new(EqualSplitFeeDistributor);

    let transfer_service = Arc::new(TransferService::new(
        store.clone(),
        schedule_client,
        message_service.clone(),
        consensus_topic_dyn,
        fee_service,
        nft_fee_service,
        distributor,
        config.hedera.bridge_account.clone(),
        config.fee.fee_members.clone(),
    ));

    let threshold_provider = Arc::new(StaticThresholdProvider::new(ThresholdParams {
        members: config.members.len().max(1) as u64,
        percentage: config.threshold.percentage,
        precision: config.threshold.precision,
    }));
    let signature_aggregator = Arc::new(SignatureAggregator::new(
        store.clone(),
        message_service,
        threshold_provider,
    ));

    let mut tasks: tokio::task::JoinSet<Result<(), Reason>> = tokio::task::JoinSet::new();

    tasks.spawn({
        let aggregator = signature_aggregator.clone();
        let rx = consensus_topic.subscribe();
        async move {
            aggregator.run(rx).await;
            Ok(())
        }
    });

    for topic in LIVE_TRANSFER_TOPICS {
        let subscription = subscriptions.remove(&topic).expect("every live topic has a subscription");
        tasks.spawn(consume_transfers(subscription, transfer_service.clone(), registry.clone()));
    }

    for evm_chain in &config.evm_chains {
        let watcher = build_evm_watcher(evm_chain, registry.clone(), store.clone(), bus.clone(), config.validator_mode);
        tasks.spawn(async move {
            watcher.run().await?;
            Ok(())
        });
    }

    let hedera_watcher = build_hedera_watcher(&config, registry.clone(), store.clone(), bus.clone());
    tasks.spawn(async move {
        hedera_watcher.run().await?;
        Ok(())
    });

    while let Some(outcome) = tasks.join_next().await {
        match outcome {
            Ok(Ok(())) => log::warn!("a supervised task exited; shutting the node down"),
            Ok(Err(e)) => log::error!("a supervised task failed: {:?}", e),
            Err(e) => log::error!("a supervised task panicked: {:?}", e),
        }
        tasks.abort_all();
        break;
    }

    Ok(())
}

async fn consume_transfers(
    mut subscription: Subscription,
    transfer_service: Arc<TransferService>,
    registry: Arc<AssetRegistry>,
) -> Result<(), Reason> {
    while let Some(message) = subscription.recv().await {
        match message {
            Message::Transfer(intent) => {
                if let Err(e) = transfer_service.handle_intent(intent, &registry).await {
                    log::warn!("transfer intent rejected: {:?}", e);
                }
            }
            // No producer emits this yet (see message_service::MemberRegistry's
            // doc comment); kept for the day a watcher's MemberUpdated handler
            // is wired to invalidate the cached member set instead of no-op.
            Message::MemberUpdated { chain_id } => {
                log::info!("member set changed for chain {:?}, no-op in this build", chain_id);
            }
        }
    }
    Ok(())
}

fn build_evm_watcher(
    chain: &crate::config::EvmChainConfig,
    registry: Arc<AssetRegistry>,
    store: TransferStore,
    bus: Arc<Bus>,
    validator_mode: bool,
) -> evm_watcher::EvmWatcher {
    let client = evm_client::EvmClient::new(chain.rpc_url.clone());
    let config = evm_watcher::EvmWatcherConfig {
        chain_id: ChainId(chain.chain_id),
        router_address: chain.router_address.clone(),
        start_block: chain.start_block,
        block_confirmations: chain.block_confirmations,
        polling_interval: Duration::from_secs(chain.polling_interval_secs),
        max_logs_blocks: chain.max_logs_blocks,
        validator_mode,
    };
    evm_watcher::EvmWatcher::new(config, client, registry, store, bus)
}

fn build_hedera_watcher(
    config: &Config,
    registry: Arc<AssetRegistry>,
    store: TransferStore,
    bus: Arc<Bus>,
) -> hedera_watcher::HederaWatcher {
    let client = MirrorClient::new(config.hedera.mirror_base_url.clone());
    let watcher_config = hedera_watcher::HederaWatcherConfig {
        bridge_account: config.hedera.bridge_account.clone(),
        polling_interval: Duration::from_secs(config.hedera.polling_interval_secs),
        validator_mode: config.validator_mode,
    };
    hedera_watcher::HederaWatcher::new(watcher_config, client, registry, store, bus)
}
