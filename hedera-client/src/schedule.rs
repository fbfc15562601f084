//! Scheduled-transaction submission: burns and fee-distribution transfers
//! are cosigned by the validator set via Hedera's native scheduled
//! transaction primitive rather than a single hot key.

use async_trait::async_trait;
use bridge_types::Reason;
use hiero_sdk::{AccountId, Client, PrivateKey, ScheduleCreateTransaction, TransactionId, TransferTransaction};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScheduleOutcome {
    SubmittedOk,
    SubmittedFail,
}

/// Abstraction over scheduled-transaction submission so `transfer-service`
/// can be tested without a live Hedera network.
#[async_trait]
pub trait ScheduleClient: Send + Sync {
    async fn schedule_burn(
        &self,
        token_id: &str,
        amount: u64,
        from_account: &str,
    ) -> Result<(String, String), Reason>;

    async fn schedule_burn_nft(
        &self,
        token_id: &str,
        serial_number: u64,
        from_account: &str,
    ) -> Result<(String, String), Reason>;

    async fn schedule_transfer(
        &self,
        hbar_amount: i64,
        from_account: &str,
        to_account: &str,
    ) -> Result<(String, String), Reason>;

    /// Polls whether `schedule_id`'s inner transaction has executed.
    /// `None` means still pending additional validator signatures; `Some`
    /// carries the mined outcome once Hedera has either executed or expired
    /// deleted the schedule.
    async fn poll_mined(&self, schedule_id: &str) -> Result<Option<bool>, Reason>;
}

pub struct HieroScheduleClient {
    client: Client,
}

impl HieroScheduleClient {
    pub fn new(client: Client, operator: AccountId, operator_key: PrivateKey) -> Self {
        client.set_operator(operator, operator_key);
        HieroScheduleClient { client }
    }
}

#[async_trait]
impl ScheduleClient for HieroScheduleClient {
    async fn schedule_burn(
        &self,
        token_id: &str,
        amount: u64,
        from_account: &str,
    ) -> Result<(String, String), Reason> {
        let mut inner = TransferTransaction::new();
        inner.token_transfer(
            token_id.parse().map_err(|_| Reason::BadConfig("bad token id".into()))?,
            from_account
                .parse()
                .map_err(|_| Reason::BadConfig("bad account id".into()))?,
            -(amount as i64),
        );

        let mut scheduled = ScheduleCreateTransaction::new();
        scheduled.scheduled_transaction(inner);

        let response = scheduled
            .execute(&self.client)
            .await
            .map_err(|e| Reason::RpcUnavailable(e.to_string()))?;
        let receipt = response
            .get_receipt(&self.client)
            .await
            .map_err(|e| Reason::RpcUnavailable(e.to_string()))?;

        let schedule_id = receipt
            .schedule_id
            .ok_or_else(|| Reason::RpcUnavailable("missing schedule id".into()))?;

        Ok((response.transaction_id.to_string(), schedule_id.to_string()))
    }

    async fn schedule_transfer(
        &self,
        hbar_amount: i64,
        from_account: &str,
        to_account: &str,
    ) -> Result<(String, String), Reason> {
        let mut inner = TransferTransaction::new();
        inner.hbar_transfer(
            from_account
                .parse()
                .map_err(|_| Reason::BadConfig("bad account id".into()))?,
            -hbar_amount,
        );
        inner.hbar_transfer(
            to_account
                .parse()
                .map_err(|_| Reason::BadConfig("bad account id".into()))?,
            hbar_amount,
        );

        let mut scheduled = ScheduleCreateTransaction::new();
        scheduled.scheduled_transaction(inner);

        let response = scheduled
            .execute(&self.client)
            .await
            .map_err(|e| Reason::RpcUnavailable(e.to_string()))?;
        let receipt = response
            .get_receipt(&self.client)
            .await
            .map_err(|e| Reason::RpcUnavailable(e.to_string()))?;

        let schedule_id = receipt
            .schedule_id
            .ok_or_else(|| Reason::RpcUnavailable("missing schedule id".into()))?;

        Ok((response.transaction_id.to_string(), schedule_id.to_string()))
    }

    async fn schedule_burn_nft(
        &self,
        token_id: &str,
        serial_number: u64,
        from_account: &str,
    ) -> Result<(String, String), Reason> {
        let token_id: hiero_sdk::TokenId = token_id.parse().map_err(|_| Reason::BadConfig("bad token id".into()))?;
        let from_account: AccountId = from_account
            .parse()
            .map_err(|_| Reason::BadConfig("bad account id".into()))?;

        let nft_id = hiero_sdk::NftId {
            token_id,
            serial_number,
        };
        let burn_sink: AccountId = "0.0.0".parse().expect("0.0.0 is a well-formed account id");
        let mut inner = TransferTransaction::new();
        inner.nft_transfer(nft_id, from_account, burn_sink);

        let mut scheduled = ScheduleCreateTransaction::new();
        scheduled.scheduled_transaction(inner);

        let response = scheduled
            .execute(&self.client)
            .await
            .map_err(|e| Reason::RpcUnavailable(e.to_string()))?;
        let receipt = response
            .get_receipt(&self.client)
            .await
            .map_err(|e| Reason::RpcUnavailable(e.to_string()))?;

        let schedule_id = receipt
            .schedule_id
            .ok_or_else(|| Reason::RpcUnavailable("missing schedule id".into()))?;

        Ok((response.transaction_id.to_string(), schedule_id.to_string()))
    }

    /// A schedule has mined once its inner transaction has either executed
    /// or been deleted (signature collection window expired). Grounded on
    /// the mirror node's own `/api/v1/schedules/{id}` shape, whose
    /// `executed_timestamp`/`deleted` fields are the only mined signal
    /// Hedera exposes — there is no push notification for schedule
    /// execution.
    async fn poll_mined(&self, schedule_id: &str) -> Result<Option<bool>, Reason> {
        let parsed: hiero_sdk::ScheduleId = schedule_id
            .parse()
            .map_err(|_| Reason::BadConfig("bad schedule id".into()))?;
        let info = hiero_sdk::ScheduleInfoQuery::new()
            .schedule_id(parsed)
            .execute(&self.client)
            .await
            .map_err(|e| Reason::RpcUnavailable(e.to_string()))?;

        if info.executed_at.is_some() {
            Ok(Some(true))
        } else if info.deleted_at.is_some() {
            Ok(Some(false))
        } else {
            Ok(None)
        }
    }
}

/// Generates fresh, uncommitted transaction ids for a `ScheduleClient` test
/// double — real ids come from `hiero_sdk::TransactionId::generate`.
pub fn new_transaction_id(account: AccountId) -> TransactionId {
    TransactionId::generate(account)
}
