//! Shared domain types for the bridge validator engine.

mod chain;
mod reason;
mod transfer;

pub use chain::ChainId;
pub use reason::{ErrorKind, Reason};
pub use transfer::{
    AssetMapping, FeeRecord, FeeStatus, ScheduleOperation, ScheduleRecord, ScheduleStatus,
    SignatureMessage, Topic, Transfer, TransferIntent, TransferStatus,
};

/// Sentinel asset string used for the native Hedera coin.
pub const HBAR: &str = "HBAR";

/// Builds the canonical EVM-origin transaction id: `"<txHash>-<logIndex>"`.
pub fn evm_tx_id(tx_hash: &str, log_index: u64) -> String {
    format!("{}-{}", tx_hash, log_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_canonical_evm_tx_id() {
        assert_eq!(evm_tx_id("0xabc", 0), "0xabc-0");
        assert_eq!(evm_tx_id("0xabc", 7), "0xabc-7");
    }

    #[test]
    fn reason_kind_classification() {
        assert_eq!(Reason::Duplicate.kind(), ErrorKind::Consistency);
        assert_eq!(Reason::BadMemo.kind(), ErrorKind::Decode);
        assert_eq!(Reason::ZeroPrecision.kind(), ErrorKind::Fatal);
        assert_eq!(Reason::UnknownAsset.kind(), ErrorKind::Business);
    }

    #[test]
    fn hedera_chain_id_is_zero() {
        assert!(ChainId::HEDERA.is_hedera());
        assert!(!ChainId(33).is_hedera());
    }
}
