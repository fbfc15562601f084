//! Scheduled-burn synchronisation (spec.md §4.6.2). `ProcessWrappedTransfer`
//! must wait for the burn to actually mine before signing the mint/unlock
//! message on the opposite chain — generalized from
//! `pallets/cash/src/internal/events.rs`'s synchronous pending/done
//! bookkeeping into an async rendezvous, since the teacher has no scheduled
//! multi-signature primitive of its own.

use crate::metrics;
use bridge_types::{Reason, ScheduleOperation, ScheduleRecord, ScheduleStatus};
use hedera_client::ScheduleClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use transfer_store::TransferStore;

const MINED_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BurnEvent {
    SubmittedOk,
    SubmittedFail,
    MinedOk,
    MinedFail,
}

pub enum BurnTarget<'a> {
    Fungible { token_id: &'a str, amount: u64 },
    Nft { token_id: &'a str, serial_number: u64 },
}

/// Executes a scheduled burn of `target` debiting `bridge_account`, and
/// blocks until it mines. Returns `Ok(())` on `MinedOk`, `Err(ScheduledBurnFailed)`
/// on any `*Fail` event. If this future is dropped before resolving, the
/// receiver half is dropped with it; the spawned poller's next `send`
/// observes the closed channel, stops retrying, and exits without leaking.
pub async fn run_scheduled_burn(
    store: TransferStore,
    schedule_client: Arc<dyn ScheduleClient>,
    transfer_id: String,
    bridge_account: String,
    target: BurnTarget<'_>,
) -> Result<(), Reason> {
    let (tx, mut rx) = mpsc::channel(4);

    let submission = match target {
        BurnTarget::Fungible { token_id, amount } => {
            schedule_client.schedule_burn(token_id, amount, &bridge_account).await
        }
        BurnTarget::Nft { token_id, serial_number } => {
            schedule_client
                .schedule_burn_nft(token_id, serial_number, &bridge_account)
                .await
        }
    };

    match submission {
        Ok((transaction_id, schedule_id)) => {
            let _ = store
                .create_schedule(&ScheduleRecord {
                    transaction_id: transaction_id.clone(),
                    schedule_id: schedule_id.clone(),
                    operation: ScheduleOperation::Burn,
                    status: ScheduleStatus::Submitted,
                    transfer_id: transfer_id.clone(),
                })
                .await;
            metrics::record_schedule_submitted("burn");
            let _ = tx.send(BurnEvent::SubmittedOk).await;
            tokio::spawn(poll_mined(store, schedule_client, tx, transaction_id, schedule_id));
        }
        Err(e) => {
            log::warn!("scheduled burn for {} failed to submit: {:?}", transfer_id, e);
            metrics::record_schedule_submission_failed("burn");
            let _ = tx.send(BurnEvent::SubmittedFail).await;
        }
    }

    loop {
        match rx.recv().await {
            Some(BurnEvent::SubmittedOk) => continue,
            Some(BurnEvent::MinedOk) => return Ok(()),
            Some(BurnEvent::SubmittedFail) | Some(BurnEvent::MinedFail) | None => {
                return Err(Reason::ScheduledBurnFailed)
            }
        }
    }
}

async fn poll_mined(
    store: TransferStore,
    schedule_client: Arc<dyn ScheduleClient>,
    tx: mpsc::Sender<BurnEvent>,
    transaction_id: String,
    schedule_id: String,
) {
    loop {
        match schedule_client.poll_mined(&schedule_id).await {
            Ok(Some(true)) => {
                let _ = store.update_schedule_status(&transaction_id, ScheduleStatus::Completed).await;
                metrics::record_schedule_mined("burn");
                let _ = tx.send(BurnEvent::MinedOk).await;
                return;
            }
            Ok(Some(false)) => {
                let _ = store.update_schedule_status(&transaction_id, ScheduleStatus::Failed).await;
                metrics::record_schedule_mined_failed("burn");
                let _ = tx.send(BurnEvent::MinedFail).await;
                return;
            }
            Ok(None) => {
                if tx.is_closed() {
                    return;
                }
                tokio::time::sleep(MINED_POLL_INTERVAL).await;
            }
            Err(e) => {
                log::warn!("poll_mined({}) failed: {:?}", schedule_id, e);
                if tx.is_closed() {
                    return;
                }
                tokio::time::sleep(MINED_POLL_INTERVAL).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burn_event_variants_cover_the_four_spec_events() {
        let all = [
            BurnEvent::SubmittedOk,
            BurnEvent::SubmittedFail,
            BurnEvent::MinedOk,
            BurnEvent::MinedFail,
        ];
        assert_eq!(all.len(), 4);
    }
}
