//! One-shot completion metric, recorded exactly once per transfer by the
//! caller guarding on `TransferStore::try_complete`'s return value.

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    static ref TRANSFERS_COMPLETED: IntCounterVec = register_int_counter_vec!(
        "bridge_transfers_completed_total",
        "Transfers that reached signature majority and completed",
        &["target_chain_id"]
    )
    .expect("metric registration is infallible outside of a name collision");
}

pub fn record_transfer_completed(target_chain_id: u64) {
    TRANSFERS_COMPLETED
        .with_label_values(&[&target_chain_id.to_string()])
        .inc();
}
