//! Postgres-backed repository for transfers, signatures, schedule records
//! and fee records. The teacher has no SQL store of its own (it persists to
//! substrate storage maps) — this crate is grounded on the row/query shapes
//! in `examples/original_source/app/persistence/*` and enriched with
//! `sqlx` the way several of the pack's other example repos pair an async
//! Rust service with Postgres.

mod rows;

use bridge_types::{
    ChainId, FeeRecord, FeeStatus, Reason, ScheduleOperation, ScheduleRecord, ScheduleStatus,
    SignatureMessage, Transfer, TransferStatus,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const POSTGRES_UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct TransferStore {
    pool: PgPool,
}

impl TransferStore {
    pub async fn connect(database_url: &str) -> Result<Self, Reason> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| Reason::DbUnavailable(e.to_string()))?;
        Ok(TransferStore { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        TransferStore { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), Reason> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Reason::DbUnavailable(e.to_string()))
    }

    pub async fn get_by_tx_id(&self, transaction_id: &str) -> Result<Option<Transfer>, Reason> {
        let row = sqlx::query_as::<_, rows::TransferRow>(
            "SELECT * FROM transfers WHERE transaction_id = $1",
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Reason::DbUnavailable(e.to_string()))?;
        Ok(row.map(Into::into))
    }

    /// Idempotent insert: a duplicate transaction id is treated as success
    /// by the caller (Consistency class), signalled here as `Reason::Duplicate`
    /// so `TransferService::initiate_new_transfer` can return the
    /// pre-existing row instead of failing the watcher's replay.
    pub async fn create(&self, transfer: &Transfer) -> Result<(), Reason> {
        let result = sqlx::query(
            "INSERT INTO transfers
             (transaction_id, source_chain_id, target_chain_id, native_chain_id,
              source_asset, target_asset, native_asset, receiver, amount,
              serial_number, metadata, fee, is_nft, status, created_at)
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15)",
        )
        .bind(&transfer.transaction_id)
        .bind(transfer.source_chain_id.0 as i64)
        .bind(transfer.target_chain_id.0 as i64)
        .bind(transfer.native_chain_id.0 as i64)
        .bind(&transfer.source_asset)
        .bind(&transfer.target_asset)
        .bind(&transfer.native_asset)
        .bind(&transfer.receiver)
        .bind(transfer.amount)
        .bind(transfer.serial_number.map(|n| n as i64))
        .bind(&transfer.metadata)
        .bind(transfer.fee)
        .bind(transfer.is_nft)
        .bind(status_str(transfer.status))
        .bind(transfer.timestamp)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(POSTGRES_UNIQUE_VIOLATION) =>
            {
                Err(Reason::Duplicate)
            }
            Err(e) => Err(Reason::DbUnavailable(e.to_string())),
        }
    }

    pub async fn update_fee(&self, transaction_id: &str, fee: rust_decimal::Decimal) -> Result<(), Reason> {
        sqlx::query("UPDATE transfers SET fee = $1 WHERE transaction_id = $2")
            .bind(fee)
            .bind(transaction_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Reason::DbUnavailable(e.to_string()))?;
        Ok(())
    }

    pub async fn update_status(
        &self,
        transaction_id: &str,
        status: TransferStatus,
    ) -> Result<(), Reason> {
        sqlx::query("UPDATE transfers SET status = $1 WHERE transaction_id = $2")
            .bind(status_str(status))
            .bind(transaction_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Reason::DbUnavailable(e.to_string()))?;
        Ok(())
    }

    /// Transitions `transaction_id` to `Completed` unless it already is,
    /// returning whether this call performed the transition. Used by the
    /// Signature Aggregator so a majority crossed by two concurrently
    /// processed signatures only records its one-shot metric once.
    pub async fn try_complete(&self, transaction_id: &str) -> Result<bool, Reason> {
        let result = sqlx::query(
            "UPDATE transfers SET status = $1 WHERE transaction_id = $2 AND status != $1",
        )
        .bind(status_str(TransferStatus::Completed))
        .bind(transaction_id)
        .execute(&self.pool)
        .await
        .map_err(|e| Reason::DbUnavailable(e.to_string()))?;
        Ok(result.rows_affected() == 1)
    }

    /// Joins the transfer with its signature messages, as `TransferData`
    /// needs for the response it serves the opposing chain's relayer.
    pub async fn get_with_preloads(
        &self,
        transaction_id: &str,
    ) -> Result<(Transfer, Vec<SignatureMessage>), Reason> {
        let transfer = self
            .get_by_tx_id(transaction_id)
            .await?
            .ok_or(Reason::NotFound)?;
        let signatures = self.signatures_for_transfer(transaction_id).await?;
        Ok((transfer, signatures))
    }

    pub async fn insert_signature(&self, message: &SignatureMessage) -> Result<(), Reason> {
        let result = sqlx::query(
            "INSERT INTO signature_messages (transfer_id, signature, hash, signer, transaction_timestamp)
             VALUES ($1,$2,$3,$4,$5)",
        )
        .bind(&message.transfer_id)
        .bind(&message.signature)
        .bind(&message.hash)
        .bind(&message.signer)
        .bind(message.transaction_timestamp)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(POSTGRES_UNIQUE_VIOLATION) =>
            {
                Err(Reason::Duplicate)
            }
            Err(e) => Err(Reason::DbUnavailable(e.to_string())),
        }
    }

    pub async fn signatures_for_transfer(
        &self,
        transfer_id: &str,
    ) -> Result<Vec<SignatureMessage>, Reason> {
        let rows = sqlx::query_as::<_, rows::SignatureRow>(
            "SELECT * FROM signature_messages WHERE transfer_id = $1",
        )
        .bind(transfer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Reason::DbUnavailable(e.to_string()))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn create_schedule(&self, record: &ScheduleRecord) -> Result<(), Reason> {
        sqlx::query(
            "INSERT INTO schedule_records (transaction_id, schedule_id, operation, status, transfer_id)
             VALUES ($1,$2,$3,$4,$5)",
        )
        .bind(&record.transaction_id)
        .bind(&record.schedule_id)
        .bind(operation_str(record.operation))
        .bind(schedule_status_str(record.status))
        .bind(&record.transfer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| Reason::DbUnavailable(e.to_string()))?;
        Ok(())
    }

    pub async fn update_schedule_status(
        &self,
        transaction_id: &str,
        status: ScheduleStatus,
    ) -> Result<(), Reason> {
        sqlx::query("UPDATE schedule_records SET status = $1 WHERE transaction_id = $2")
            .bind(schedule_status_str(status))
            .bind(transaction_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Reason::DbUnavailable(e.to_string()))?;
        Ok(())
    }

    pub async fn schedules_for_transfer(
        &self,
        transfer_id: &str,
    ) -> Result<Vec<ScheduleRecord>, Reason> {
        let rows = sqlx::query_as::<_, rows::ScheduleRow>(
            "SELECT * FROM schedule_records WHERE transfer_id = $1",
        )
        .bind(transfer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Reason::DbUnavailable(e.to_string()))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn create_fee(&self, record: &FeeRecord) -> Result<(), Reason> {
        sqlx::query(
            "INSERT INTO fee_records (transaction_id, schedule_id, amount, status, transfer_id)
             VALUES ($1,$2,$3,$4,$5)",
        )
        .bind(&record.transaction_id)
        .bind(&record.schedule_id)
        .bind(record.amount)
        .bind(schedule_status_str(record.status))
        .bind(&record.transfer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| Reason::DbUnavailable(e.to_string()))?;
        Ok(())
    }

    pub async fn update_fee_status(
        &self,
        transaction_id: &str,
        status: FeeStatus,
    ) -> Result<(), Reason> {
        sqlx::query("UPDATE fee_records SET status = $1 WHERE transaction_id = $2")
            .bind(schedule_status_str(status))
            .bind(transaction_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Reason::DbUnavailable(e.to_string()))?;
        Ok(())
    }

    /// Supplemented from `app/persistence/fee/fee.go`'s `GetAllWithStatus`
    /// read path.
    pub async fn fees_for_transfer(&self, transfer_id: &str) -> Result<Vec<FeeRecord>, Reason> {
        let rows = sqlx::query_as::<_, rows::FeeRow>(
            "SELECT * FROM fee_records WHERE transfer_id = $1",
        )
        .bind(transfer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Reason::DbUnavailable(e.to_string()))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Status Store: one row per watcher identity, `"<chainId>-<routerAddress>"`
    /// or the literal `"hedera"`.
    pub async fn get_watcher_status(&self, watcher_id: &str) -> Result<Option<String>, Reason> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT last_processed FROM watcher_status WHERE watcher_id = $1")
                .bind(watcher_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| Reason::DbUnavailable(e.to_string()))?;
        Ok(row.map(|(v,)| v))
    }

    pub async fn set_watcher_status(
        &self,
        watcher_id: &str,
        last_processed: &str,
    ) -> Result<(), Reason> {
        sqlx::query(
            "INSERT INTO watcher_status (watcher_id, last_processed) VALUES ($1, $2)
             ON CONFLICT (watcher_id) DO UPDATE SET last_processed = EXCLUDED.last_processed",
        )
        .bind(watcher_id)
        .bind(last_processed)
        .execute(&self.pool)
        .await
        .map_err(|e| Reason::DbUnavailable(e.to_string()))?;
        Ok(())
    }
}

pub fn watcher_id_for_evm(chain_id: ChainId, router_address: &str) -> String {
    format!("{}-{}", chain_id.0, router_address)
}

pub const HEDERA_WATCHER_ID: &str = "hedera";

fn status_str(status: TransferStatus) -> &'static str {
    match status {
        TransferStatus::Initiated => "Initiated",
        TransferStatus::InProgress => "InProgress",
        TransferStatus::Completed => "Completed",
        TransferStatus::Failed => "Failed",
    }
}

fn operation_str(op: ScheduleOperation) -> &'static str {
    match op {
        ScheduleOperation::Burn => "Burn",
        ScheduleOperation::Transfer => "Transfer",
    }
}

fn schedule_status_str(status: ScheduleStatus) -> &'static str {
    match status {
        ScheduleStatus::Submitted => "Submitted",
        ScheduleStatus::Completed => "Completed",
        ScheduleStatus::Failed => "Failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watcher_id_combines_chain_and_router() {
        let id = watcher_id_for_evm(ChainId(33), "0xabc");
        assert_eq!(id, "33-0xabc");
    }

    #[test]
    fn status_strings_cover_every_variant() {
        for status in [
            TransferStatus::Initiated,
            TransferStatus::InProgress,
            TransferStatus::Completed,
            TransferStatus::Failed,
        ] {
            assert!(!status_str(status).is_empty());
        }
    }
}
