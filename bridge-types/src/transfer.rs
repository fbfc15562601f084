use crate::chain::ChainId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
    Initiated,
    InProgress,
    Completed,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub transaction_id: String,
    pub source_chain_id: ChainId,
    pub target_chain_id: ChainId,
    pub native_chain_id: ChainId,
    pub source_asset: String,
    pub target_asset: String,
    pub native_asset: String,
    pub receiver: String,
    pub amount: Decimal,
    pub serial_number: Option<u64>,
    pub metadata: Option<String>,
    pub fee: Option<Decimal>,
    pub is_nft: bool,
    pub status: TransferStatus,
    pub timestamp: DateTime<Utc>,
}

impl Transfer {
    /// `(nativeChainId == hederaId) ⇒ fee is eventually non-empty` — callers
    /// use this to decide whether `TransferData` may be served yet.
    pub fn fee_required(&self) -> bool {
        self.native_chain_id.is_hedera()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignatureMessage {
    pub transfer_id: String,
    pub signature: String,
    pub hash: String,
    pub signer: String,
    pub transaction_timestamp: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleOperation {
    Burn,
    Transfer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleStatus {
    Submitted,
    Completed,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub transaction_id: String,
    pub schedule_id: String,
    pub operation: ScheduleOperation,
    pub status: ScheduleStatus,
    pub transfer_id: String,
}

pub type FeeStatus = ScheduleStatus;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeeRecord {
    pub transaction_id: String,
    pub schedule_id: String,
    pub amount: Decimal,
    pub status: FeeStatus,
    pub transfer_id: String,
}

/// In-memory native/wrapped asset mapping entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetMapping {
    pub chain_id: ChainId,
    pub address: String,
    pub opposite_chain_id: ChainId,
    pub opposite_address: String,
    pub decimals: u8,
    pub opposite_decimals: u8,
}

/// The payload a Watcher enqueues for the Transfer Service: almost a
/// `Transfer` but not yet persisted (no status, no timestamp assigned by
/// the store).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferIntent {
    pub transaction_id: String,
    pub source_chain_id: ChainId,
    pub target_chain_id: ChainId,
    pub native_chain_id: ChainId,
    pub source_asset: String,
    pub target_asset: String,
    pub native_asset: String,
    pub receiver: String,
    pub amount: Decimal,
    pub serial_number: Option<u64>,
    pub metadata: Option<String>,
    pub is_nft: bool,
}

impl TransferIntent {
    pub fn into_transfer(self, timestamp: DateTime<Utc>) -> Transfer {
        Transfer {
            transaction_id: self.transaction_id,
            source_chain_id: self.source_chain_id,
            target_chain_id: self.target_chain_id,
            native_chain_id: self.native_chain_id,
            source_asset: self.source_asset,
            target_asset: self.target_asset,
            native_asset: self.native_asset,
            receiver: self.receiver,
            amount: self.amount,
            serial_number: self.serial_number,
            metadata: self.metadata,
            fee: None,
            is_nft: self.is_nft,
            status: TransferStatus::Initiated,
            timestamp,
        }
    }
}

/// Closed set of message-queue topic tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    TopicMessageSubmission,
    HederaMintHtsTransfer,
    HederaFeeTransfer,
    HederaNftTransfer,
    ReadOnlyTransferSave,
    ReadOnlyHederaTransfer,
    ReadOnlyHederaMintHtsTransfer,
}

impl Topic {
    pub const ALL: [Topic; 7] = [
        Topic::TopicMessageSubmission,
        Topic::HederaMintHtsTransfer,
        Topic::HederaFeeTransfer,
        Topic::HederaNftTransfer,
        Topic::ReadOnlyTransferSave,
        Topic::ReadOnlyHederaTransfer,
        Topic::ReadOnlyHederaMintHtsTransfer,
    ];
}
