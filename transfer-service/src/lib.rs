//! Transfer lifecycle coordinator (spec.md §4.6): sanity-checks inbound
//! transfers, persists them idempotently, and drives the two Hedera-side
//! payout paths (native fee distribution, wrapped-asset burn) to the point
//! where a signature can be produced and published. Grounded on
//! `pallets/cash/src/internal/lock.rs`'s event → internal action → emit
//! staged-processing shape, generalized from a single synchronous runtime
//! call into the async orchestration a real scheduled-transaction round
//! trip requires.

pub mod burn_sync;
pub mod distribution;
pub mod fee;
mod metrics;
pub mod view;

use bridge_types::{ChainId, Reason, Transfer, TransferIntent, TransferStatus};
use burn_sync::{run_scheduled_burn, BurnTarget};
use fee::{clamp_to_members, FeeDistributor, FeeService, NftFeeService};
use hedera_client::ScheduleClient;
use message_service::{ConsensusTopic, MessageService};
use std::sync::Arc;
use transfer_store::TransferStore;
use view::TransferData;

pub struct TransferService {
    store: TransferStore,
    schedule_client: Arc<dyn ScheduleClient>,
    message_service: Arc<MessageService>,
    consensus_topic: Arc<dyn ConsensusTopic>,
    fee_service: Arc<dyn FeeService>,
    nft_fee_service: Arc<dyn NftFeeService>,
    distributor: Arc<dyn FeeDistributor>,
    bridge_account: String,
    fee_members: Vec<String>,
}

impl TransferService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: TransferStore,
        schedule_client: Arc<dyn ScheduleClient>,
        message_service: Arc<MessageService>,
        consensus_topic: Arc<dyn ConsensusTopic>,
        fee_service: Arc<dyn FeeService>,
        nft_fee_service: Arc<dyn NftFeeService>,
        distributor: Arc<dyn FeeDistributor>,
        bridge_account: String,
        fee_members: Vec<String>,
    ) -> Self {
        TransferService {
            store,
            schedule_client,
            message_service,
            consensus_topic,
            fee_service,
            nft_fee_service,
            distributor,
            bridge_account,
            fee_members,
        }
    }

    /// Parses a Hedera transaction memo into `(targetChainId, receiver)`.
    pub fn sanity_check_transfer(&self, memo_base64: &str) -> Result<(ChainId, String), Reason> {
        hedera_client::parse_memo(memo_base64)
    }

    /// Idempotent insert: a `Duplicate` from the store means another
    /// replay of the same watcher event already persisted this transfer —
    /// the caller gets the pre-existing row back, not an error.
    pub async fn initiate_new_transfer(&self, intent: TransferIntent) -> Result<Transfer, Reason> {
        let transfer = intent.into_transfer(chrono::Utc::now());
        match self.store.create(&transfer).await {
            Ok(()) => Ok(transfer),
            Err(Reason::Duplicate) => self
                .store
                .get_by_tx_id(&transfer.transaction_id)
                .await?
                .ok_or(Reason::Duplicate),
            Err(e) => Err(e),
        }
    }

    /// Routes a freshly initiated transfer to the path its fields call for:
    /// a Hedera-native asset (either direction) needs the fee-distribution
    /// path, a wrapped asset being returned to Hedera needs a burn first,
    /// and everything else (an asset bridged between two non-Hedera chains,
    /// or locked onto Hedera without itself being Hedera-native) is signed
    /// directly with no Hedera-side action.
    pub async fn handle_intent(&self, intent: TransferIntent, registry: &asset_registry::AssetRegistry) -> Result<(), Reason> {
        let native_is_hedera = intent.native_chain_id.is_hedera();
        let source_is_hedera = intent.source_chain_id.is_hedera();
        let is_nft = intent.is_nft;

        let transfer = self.initiate_new_transfer(intent).await?;
        if transfer.status != TransferStatus::Initiated {
            // Already picked up by a previous delivery of the same intent.
            return Ok(());
        }

        if native_is_hedera && is_nft {
            self.process_native_nft_transfer(transfer).await
        } else if native_is_hedera {
            self.process_native_transfer(transfer).await
        } else if source_is_hedera {
            self.process_wrapped_transfer(transfer, registry).await
        } else {
            self.process_transfer(transfer).await
        }
    }

    /// No Hedera-side action required: sign and publish directly. Used for
    /// transfers whose native asset lives on neither side of this hop (e.g.
    /// a genuinely foreign-chain asset locked to mint a Hedera-side
    /// representation).
    pub async fn process_transfer(&self, mut transfer: Transfer) -> Result<(), Reason> {
        self.sign_and_publish(&mut transfer).await
    }

    /// Hedera-native fungible path.
    pub async fn process_native_transfer(&self, mut transfer: Transfer) -> Result<(), Reason> {
        let (raw_fee, _) = self.fee_service.calculate_fee(&transfer.native_asset, transfer.amount);
        self.distribute_and_sign(&mut transfer, raw_fee).await
    }

    /// Hedera-native NFT path: fixed flat HBAR fee regardless of `amount`.
    pub async fn process_native_nft_transfer(&self, mut transfer: Transfer) -> Result<(), Reason> {
        let raw_fee = self.nft_fee_service.flat_fee(&transfer.native_asset);
        self.distribute_and_sign(&mut transfer, raw_fee).await
    }

    async fn distribute_and_sign(&self, transfer: &mut Transfer, raw_fee: rust_decimal::Decimal) -> Result<(), Reason> {
        // residue is discarded here: it is folded into the remainder
        // automatically, since effective_amount = amount - fee and fee is
        // the clamped (smaller) value.
        let (clamped_fee, _residue) = clamp_to_members(raw_fee, self.fee_members.len().max(1));

        self.store.update_fee(&transfer.transaction_id, clamped_fee).await?;
        transfer.fee = Some(clamped_fee);

        if !self.fee_members.is_empty() && clamped_fee > rust_decimal::Decimal::ZERO {
            distribution::dispatch_fee_distribution(
                self.store.clone(),
                self.schedule_client.clone(),
                self.distributor.clone(),
                transfer.transaction_id.clone(),
                self.bridge_account.clone(),
                clamped_fee,
                self.fee_members.clone(),
            );
        }

        self.sign_and_publish(transfer).await
    }

    /// Hedera-wrapped path: burns the wrapped HTS token/NFT on Hedera before
    /// signing — the amount carried on `transfer` is already expressed in
    /// the *opposite* (target) chain's decimal resolution (computed by the
    /// Hedera Watcher via `AssetRegistry::remove_decimals`); burning needs
    /// the *Hedera-side* raw integer, recovered by inverting that same
    /// scaling call.
    pub async fn process_wrapped_transfer(
        &self,
        mut transfer: Transfer,
        registry: &asset_registry::AssetRegistry,
    ) -> Result<(), Reason> {
        if transfer.is_nft {
            let serial_number = transfer
                .serial_number
                .ok_or_else(|| Reason::MalformedEvent("nft transfer missing serial number".into()))?;
            run_scheduled_burn(
                self.store.clone(),
                self.schedule_client.clone(),
                transfer.transaction_id.clone(),
                self.bridge_account.clone(),
                BurnTarget::Nft {
                    token_id: &transfer.source_asset,
                    serial_number,
                },
            )
            .await?;
        } else {
            let hedera_raw = registry.remove_decimals(transfer.target_chain_id, &transfer.target_asset, transfer.amount)?;
            if hedera_raw.is_zero() {
                return Err(Reason::ZeroAmountAfterDecimals);
            }
            use rust_decimal::prelude::ToPrimitive;
            let amount = hedera_raw.to_u64().ok_or(Reason::UnparsableAmount)?;
            run_scheduled_burn(
                self.store.clone(),
                self.schedule_client.clone(),
                transfer.transaction_id.clone(),
                self.bridge_account.clone(),
                BurnTarget::Fungible {
                    token_id: &transfer.source_asset,
                    amount,
                },
            )
            .await?;
        }

        self.sign_and_publish(&mut transfer).await
    }

    async fn sign_and_publish(&self, transfer: &mut Transfer) -> Result<(), Reason> {
        transfer.status = TransferStatus::InProgress;
        self.store.update_status(&transfer.transaction_id, TransferStatus::InProgress).await?;

        let message = self.message_service.sign_message(transfer).await?;
        self.consensus_topic.publish(&message).await
    }

    /// `{isNft, recipient, routerAddress, sourceChainId, targetChainId,
    /// sourceAsset, nativeAsset, targetAsset, signatures[], majority,
    /// amount|tokenId+metadata}`. *NotFound* if absent, or if native=Hedera
    /// and fee not yet assigned.
    pub async fn transfer_data(
        &self,
        transaction_id: &str,
        router_address: String,
        required_signatures: usize,
    ) -> Result<TransferData, Reason> {
        let (transfer, signatures) = self.store.get_with_preloads(transaction_id).await?;
        if transfer.fee_required() && transfer.fee.is_none() {
            return Err(Reason::NotFound);
        }
        let schedules = self.store.schedules_for_transfer(transaction_id).await?;
        let fees = self.store.fees_for_transfer(transaction_id).await?;
        let majority = signatures.len() >= required_signatures;
        Ok(view::build(&transfer, signatures, schedules, fees, majority, router_address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fee::{EqualSplitFeeDistributor, FlatNftFeeService, PercentageFeeService};
    use std::collections::HashMap;

    #[test]
    fn sanity_check_transfer_delegates_to_memo_parsing() {
        // reachable without a store/keyring: a thin wrapper, exercised
        // directly against `hedera_client::parse_memo` instead.
        assert!(hedera_client::parse_memo("not valid base64!!").is_err());
    }

    #[test]
    fn fee_services_compose_the_way_distribute_and_sign_expects() {
        let pct = PercentageFeeService::new(100); // 1%
        let (fee, remainder) = pct.calculate_fee("HBAR", rust_decimal::Decimal::from(1000));
        assert_eq!(fee, rust_decimal::Decimal::from(10));
        assert_eq!(remainder, rust_decimal::Decimal::from(990));

        let nft_fee = FlatNftFeeService::new(HashMap::new(), rust_decimal::Decimal::from(2));
        assert_eq!(nft_fee.flat_fee("0.0.1"), rust_decimal::Decimal::from(2));

        let distributor = EqualSplitFeeDistributor;
        let members = vec!["0.0.1".to_owned(), "0.0.2".to_owned()];
        let splits = distributor.calculate_member_distribution(fee, &members);
        assert_eq!(splits.len(), 2);
    }
}
