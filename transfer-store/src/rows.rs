//! Wire/row shapes separate from the domain types in `bridge-types`, since
//! enums persist as text and chain ids persist as `BIGINT`. Kept deliberately
//! dumb: conversion, not validation, happens here.

use bridge_types::{
    ChainId, FeeRecord, ScheduleOperation, ScheduleRecord, ScheduleStatus, SignatureMessage,
    Transfer, TransferStatus,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(FromRow)]
pub struct TransferRow {
    pub transaction_id: String,
    pub source_chain_id: i64,
    pub target_chain_id: i64,
    pub native_chain_id: i64,
    pub source_asset: String,
    pub target_asset: String,
    pub native_asset: String,
    pub receiver: String,
    pub amount: Decimal,
    pub serial_number: Option<i64>,
    pub metadata: Option<String>,
    pub fee: Option<Decimal>,
    pub is_nft: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<TransferRow> for Transfer {
    fn from(row: TransferRow) -> Self {
        Transfer {
            transaction_id: row.transaction_id,
            source_chain_id: ChainId(row.source_chain_id as u64),
            target_chain_id: ChainId(row.target_chain_id as u64),
            native_chain_id: ChainId(row.native_chain_id as u64),
            source_asset: row.source_asset,
            target_asset: row.target_asset,
            native_asset: row.native_asset,
            receiver: row.receiver,
            amount: row.amount,
            serial_number: row.serial_number.map(|n| n as u64),
            metadata: row.metadata,
            fee: row.fee,
            is_nft: row.is_nft,
            status: parse_status(&row.status),
            timestamp: row.created_at,
        }
    }
}

#[derive(FromRow)]
pub struct SignatureRow {
    pub transfer_id: String,
    pub signature: String,
    pub hash: String,
    pub signer: String,
    pub transaction_timestamp: DateTime<Utc>,
}

impl From<SignatureRow> for SignatureMessage {
    fn from(row: SignatureRow) -> Self {
        SignatureMessage {
            transfer_id: row.transfer_id,
            signature: row.signature,
            hash: row.hash,
            signer: row.signer,
            transaction_timestamp: row.transaction_timestamp,
        }
    }
}

#[derive(FromRow)]
pub struct ScheduleRow {
    pub transaction_id: String,
    pub schedule_id: String,
    pub operation: String,
    pub status: String,
    pub transfer_id: String,
}

impl From<ScheduleRow> for ScheduleRecord {
    fn from(row: ScheduleRow) -> Self {
        ScheduleRecord {
            transaction_id: row.transaction_id,
            schedule_id: row.schedule_id,
            operation: parse_operation(&row.operation),
            status: parse_schedule_status(&row.status),
            transfer_id: row.transfer_id,
        }
    }
}

#[derive(FromRow)]
pub struct FeeRow {
    pub transaction_id: String,
    pub schedule_id: String,
    pub amount: Decimal,
    pub status: String,
    pub transfer_id: String,
}

impl From<FeeRow> for FeeRecord {
    fn from(row: FeeRow) -> Self {
        FeeRecord {
            transaction_id: row.transaction_id,
            schedule_id: row.schedule_id,
            amount: row.amount,
            status: parse_schedule_status(&row.status),
            transfer_id: row.transfer_id,
        }
    }
}

fn parse_status(s: &str) -> TransferStatus {
    match s {
        "InProgress" => TransferStatus::InProgress,
        "Completed" => TransferStatus::Completed,
        "Failed" => TransferStatus::Failed,
        _ => TransferStatus::Initiated,
    }
}

fn parse_operation(s: &str) -> ScheduleOperation {
    match s {
        "Transfer" => ScheduleOperation::Transfer,
        _ => ScheduleOperation::Burn,
    }
}

fn parse_schedule_status(s: &str) -> ScheduleStatus {
    match s {
        "Completed" => ScheduleStatus::Completed,
        "Failed" => ScheduleStatus::Failed,
        _ => ScheduleStatus::Submitted,
    }
}
