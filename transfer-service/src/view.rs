//! `TransferData` (spec.md §4.6): the joined view a relayer on the opposite
//! chain polls to learn whether a transfer has enough signatures to submit
//! on-chain.

use bridge_types::{ChainId, FeeRecord, ScheduleRecord, SignatureMessage, Transfer};
use rust_decimal::Decimal;

#[derive(Clone, Debug, PartialEq)]
pub enum TransferAmount {
    Fungible(Decimal),
    Nft { token_id: String, metadata: Option<String> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransferData {
    pub is_nft: bool,
    pub recipient: String,
    pub router_address: String,
    pub source_chain_id: ChainId,
    pub target_chain_id: ChainId,
    pub source_asset: String,
    pub native_asset: String,
    pub target_asset: String,
    pub signatures: Vec<SignatureMessage>,
    pub schedules: Vec<ScheduleRecord>,
    pub fees: Vec<FeeRecord>,
    pub majority: bool,
    pub amount: TransferAmount,
}

/// `router_address` is the target chain's router contract (unknown to the
/// `Transfer` row itself, which only records chain/asset identities) — the
/// caller supplies it from its own chain-config lookup. `schedules`/`fees`
/// are the scheduled-transaction and fee-distribution rows raised against
/// this transfer, if any.
pub fn build(
    transfer: &Transfer,
    signatures: Vec<SignatureMessage>,
    schedules: Vec<ScheduleRecord>,
    fees: Vec<FeeRecord>,
    majority: bool,
    router_address: String,
) -> TransferData {
    let amount = if transfer.is_nft {
        TransferAmount::Nft {
            token_id: transfer.target_asset.clone(),
            metadata: transfer.metadata.clone(),
        }
    } else {
        TransferAmount::Fungible(message_service::payload::effective_amount(transfer))
    };

    TransferData {
        is_nft: transfer.is_nft,
        recipient: transfer.receiver.clone(),
        router_address,
        source_chain_id: transfer.source_chain_id,
        target_chain_id: transfer.target_chain_id,
        source_asset: transfer.source_asset.clone(),
        native_asset: transfer.native_asset.clone(),
        target_asset: transfer.target_asset.clone(),
        signatures,
        schedules,
        fees,
        majority,
        amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::TransferStatus;
    use chrono::Utc;

    fn sample_transfer() -> Transfer {
        Transfer {
            transaction_id: "0xabc-0".into(),
            source_chain_id: ChainId(33),
            target_chain_id: ChainId::HEDERA,
            native_chain_id: ChainId::HEDERA,
            source_asset: "0xdead".into(),
            target_asset: "HBAR".into(),
            native_asset: "0xdead".into(),
            receiver: "0.0.999".into(),
            amount: Decimal::from(100),
            serial_number: None,
            metadata: None,
            fee: Some(Decimal::from(1)),
            is_nft: false,
            status: TransferStatus::Initiated,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn fungible_transfer_reports_the_fee_subtracted_amount_when_hedera_native() {
        let view = build(&sample_transfer(), Vec::new(), Vec::new(), Vec::new(), false, "0xrouter".into());
        assert_eq!(view.amount, TransferAmount::Fungible(Decimal::from(99)));
        assert!(!view.is_nft);
    }

    #[test]
    fn fungible_transfer_reports_the_gross_amount_when_not_hedera_native() {
        let mut transfer = sample_transfer();
        transfer.native_chain_id = ChainId(33);
        let view = build(&transfer, Vec::new(), Vec::new(), Vec::new(), false, "0xrouter".into());
        assert_eq!(view.amount, TransferAmount::Fungible(Decimal::from(100)));
    }

    #[test]
    fn nft_transfer_reports_token_id_and_metadata() {
        let mut transfer = sample_transfer();
        transfer.is_nft = true;
        transfer.target_asset = "0.0.555".into();
        transfer.metadata = Some("ipfs://x".into());
        let view = build(&transfer, Vec::new(), Vec::new(), Vec::new(), true, "0xrouter".into());
        assert_eq!(
            view.amount,
            TransferAmount::Nft {
                token_id: "0.0.555".into(),
                metadata: Some("ipfs://x".into())
            }
        );
        assert!(view.majority);
    }

    #[test]
    fn joins_schedule_and_fee_rows_into_the_view() {
        let schedule = ScheduleRecord {
            transaction_id: "0xabc-0".into(),
            schedule_id: "0.0.1234".into(),
            operation: bridge_types::ScheduleOperation::Transfer,
            status: bridge_types::ScheduleStatus::Submitted,
            transfer_id: "0xabc-0".into(),
        };
        let fee = FeeRecord {
            transaction_id: "0xabc-0".into(),
            schedule_id: "0.0.1235".into(),
            amount: Decimal::from(1),
            status: bridge_types::FeeStatus::Submitted,
            transfer_id: "0xabc-0".into(),
        };
        let view = build(
            &sample_transfer(),
            Vec::new(),
            vec![schedule.clone()],
            vec![fee.clone()],
            false,
            "0xrouter".into(),
        );
        assert_eq!(view.schedules, vec![schedule]);
        assert_eq!(view.fees, vec![fee]);
    }
}
