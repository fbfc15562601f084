//! "Signatures received" (SPEC_FULL §6 Metrics).

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    static ref SIGNATURES_RECEIVED: IntCounterVec = register_int_counter_vec!(
        "bridge_signatures_received_total",
        "Signature envelopes accepted by the Message Service",
        &["target_chain_id"]
    )
    .expect("metric registration is infallible outside of a name collision");
}

pub fn record_signature_received(target_chain_id: u64) {
    SIGNATURES_RECEIVED
        .with_label_values(&[&target_chain_id.to_string()])
        .inc();
}
