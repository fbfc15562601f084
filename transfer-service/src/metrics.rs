//! Scheduled-transaction outcomes (SPEC_FULL §6 Metrics): one counter
//! covering both fee-split transfers and wrapped-asset burns, labeled by
//! which kind of schedule it is and how it resolved.

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    static ref SCHEDULE_OUTCOMES: IntCounterVec = register_int_counter_vec!(
        "bridge_scheduled_transactions_total",
        "Scheduled Hedera transactions by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("metric registration is infallible outside of a name collision");
}

pub fn record_schedule_submitted(operation: &str) {
    SCHEDULE_OUTCOMES.with_label_values(&[operation, "submitted"]).inc();
}

pub fn record_schedule_submission_failed(operation: &str) {
    SCHEDULE_OUTCOMES.with_label_values(&[operation, "submission_failed"]).inc();
}

pub fn record_schedule_mined(operation: &str) {
    SCHEDULE_OUTCOMES.with_label_values(&[operation, "mined"]).inc();
}

pub fn record_schedule_mined_failed(operation: &str) {
    SCHEDULE_OUTCOMES.with_label_values(&[operation, "mined_failed"]).inc();
}
