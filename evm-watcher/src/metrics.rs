//! "Transfers ingested per chain" (SPEC_FULL §6 Metrics). Registered against
//! the process-global `prometheus` default registry, the same one
//! `validator-node` exposes — the binary need not thread a handle through
//! every watcher for this to show up once wired into one process.

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    static ref TRANSFERS_INGESTED: IntCounterVec = register_int_counter_vec!(
        "bridge_evm_transfers_ingested_total",
        "Bridge transfer intents enqueued by the EVM Watcher",
        &["chain_id"]
    )
    .expect("metric registration is infallible outside of a name collision");
}

pub fn record_ingested(chain_id: u64) {
    TRANSFERS_INGESTED.with_label_values(&[&chain_id.to_string()]).inc();
}
