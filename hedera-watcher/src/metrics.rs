//! "Transfers ingested per chain" (SPEC_FULL §6 Metrics), mirroring
//! `evm-watcher::metrics`.

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    static ref TRANSFERS_INGESTED: IntCounterVec = register_int_counter_vec!(
        "bridge_hedera_transfers_ingested_total",
        "Bridge transfer intents enqueued by the Hedera Watcher",
        &["chain_id"]
    )
    .expect("metric registration is infallible outside of a name collision");
}

pub fn record_ingested(chain_id: u64) {
    TRANSFERS_INGESTED.with_label_values(&[&chain_id.to_string()]).inc();
}
