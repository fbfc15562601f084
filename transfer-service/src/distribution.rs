//! Fee-distribution state machine (spec.md §4.6.1). Fire-and-forget: the
//! transfer's `fee` column is committed before any split is scheduled (so
//! `TransferData` is servable immediately), and each split's own
//! Schedule/Fee rows move independently from `Submitted` to
//! `Completed`/`Failed` as callbacks land. Grounded on
//! `examples/original_source/app/service/transfers`'s split-then-watch
//! sequencing (per `_INDEX.md`).

use crate::fee::FeeDistributor;
use crate::metrics;
use bridge_types::{FeeRecord, FeeStatus, ScheduleOperation, ScheduleRecord, ScheduleStatus};
use hedera_client::ScheduleClient;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use transfer_store::TransferStore;

const MINED_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Spawns one task per member split; each schedules a transfer debiting
/// `bridge_account`, records `onExecutionSuccess`/`onExecutionFail`
/// synchronously, then spawns a poller that records
/// `onMinedSuccess`/`onMinedFail` once Hedera has executed it.
pub fn dispatch_fee_distribution(
    store: TransferStore,
    schedule_client: Arc<dyn ScheduleClient>,
    distributor: Arc<dyn FeeDistributor>,
    transfer_id: String,
    bridge_account: String,
    clamped_fee: Decimal,
    members: Vec<String>,
) {
    let splits = distributor.calculate_member_distribution(clamped_fee, &members);
    for (member, share) in splits {
        let store = store.clone();
        let schedule_client = schedule_client.clone();
        let bridge_account = bridge_account.clone();
        let transfer_id = transfer_id.clone();
        tokio::spawn(async move {
            run_split(store, schedule_client, transfer_id, bridge_account, member, share).await;
        });
    }
}

async fn run_split(
    store: TransferStore,
    schedule_client: Arc<dyn ScheduleClient>,
    transfer_id: String,
    bridge_account: String,
    member_account: String,
    amount: Decimal,
) {
    use rust_decimal::prelude::ToPrimitive;
    let hbar_amount = amount.to_i64().unwrap_or(0);

    match schedule_client
        .schedule_transfer(hbar_amount, &bridge_account, &member_account)
        .await
    {
        Ok((transaction_id, schedule_id)) => {
            metrics::record_schedule_submitted("fee");
            on_execution_success(&store, &transfer_id, &transaction_id, &schedule_id, amount).await;
            poll_mined(store, schedule_client, transaction_id, schedule_id).await;
        }
        Err(e) => {
            log::warn!("fee split to {} failed to submit: {:?}", member_account, e);
            metrics::record_schedule_submission_failed("fee");
            on_execution_fail(&store, &transfer_id, &member_account, amount).await;
        }
    }
}

async fn on_execution_success(
    store: &TransferStore,
    transfer_id: &str,
    transaction_id: &str,
    schedule_id: &str,
    amount: Decimal,
) {
    let _ = store
        .create_schedule(&ScheduleRecord {
            transaction_id: transaction_id.to_owned(),
            schedule_id: schedule_id.to_owned(),
            operation: ScheduleOperation::Transfer,
            status: ScheduleStatus::Submitted,
            transfer_id: transfer_id.to_owned(),
        })
        .await;
    let _ = store
        .create_fee(&FeeRecord {
            transaction_id: transaction_id.to_owned(),
            schedule_id: schedule_id.to_owned(),
            amount,
            status: FeeStatus::Submitted,
            transfer_id: transfer_id.to_owned(),
        })
        .await;
}

async fn on_execution_fail(store: &TransferStore, transfer_id: &str, member_account: &str, amount: Decimal) {
    let placeholder = format!("{}-fee-{}-rejected", transfer_id, member_account);
    let _ = store
        .create_schedule(&ScheduleRecord {
            transaction_id: placeholder.clone(),
            schedule_id: String::new(),
            operation: ScheduleOperation::Transfer,
            status: ScheduleStatus::Failed,
            transfer_id: transfer_id.to_owned(),
        })
        .await;
    let _ = store
        .create_fee(&FeeRecord {
            transaction_id: placeholder,
            schedule_id: String::new(),
            amount,
            status: FeeStatus::Failed,
            transfer_id: transfer_id.to_owned(),
        })
        .await;
}

async fn poll_mined(
    store: TransferStore,
    schedule_client: Arc<dyn ScheduleClient>,
    transaction_id: String,
    schedule_id: String,
) {
    loop {
        match schedule_client.poll_mined(&schedule_id).await {
            Ok(Some(true)) => {
                let _ = store.update_schedule_status(&transaction_id, ScheduleStatus::Completed).await;
                let _ = store.update_fee_status(&transaction_id, FeeStatus::Completed).await;
                metrics::record_schedule_mined("fee");
                return;
            }
            Ok(Some(false)) => {
                let _ = store.update_schedule_status(&transaction_id, ScheduleStatus::Failed).await;
                let _ = store.update_fee_status(&transaction_id, FeeStatus::Failed).await;
                metrics::record_schedule_mined_failed("fee");
                return;
            }
            Ok(None) => tokio::time::sleep(MINED_POLL_INTERVAL).await,
            Err(e) => {
                log::warn!("poll_mined({}) failed: {:?}", schedule_id, e);
                tokio::time::sleep(MINED_POLL_INTERVAL).await;
            }
        }
    }
}
