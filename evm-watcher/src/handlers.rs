//! Per-event-type dispatch rules (spec.md §4.4). Each handler resolves the
//! opposite asset, validates the receiver, normalises the amount, and picks
//! the queue topic; `EvmWatcher::poll_once` only worries about checkpoints.

use asset_registry::AssetRegistry;
use bridge_types::{ChainId, Reason, Topic, TransferIntent, HBAR};
use evm_client::{DecodedLog, RouterEvent};
use rust_decimal::Decimal;
use std::str::FromStr;

/// `None` means the event is valid but carries no transfer intent
/// (`MemberUpdated`, or a `Mint`/`Unlock` confirmation of a transfer this
/// chain itself completed — there is nothing further to enqueue for those).
pub fn handle_event(
    registry: &AssetRegistry,
    source_chain: ChainId,
    log: &DecodedLog,
) -> Result<Option<(Topic, TransferIntent)>, Reason> {
    match &log.event {
        RouterEvent::Lock {
            target_chain,
            token,
            amount,
            receiver,
            ..
        } => lock(
            registry,
            source_chain,
            *target_chain,
            token,
            *amount,
            receiver,
            log,
        )
        .map(Some),
        RouterEvent::Burn {
            target_chain,
            token,
            amount,
            receiver,
        } => burn(
            registry,
            source_chain,
            *target_chain,
            token,
            *amount,
            receiver,
            log,
            false,
            None,
        )
        .map(Some),
        RouterEvent::BurnErc721 {
            target_chain,
            token,
            token_id,
            receiver,
        } => burn(
            registry,
            source_chain,
            *target_chain,
            token,
            0,
            receiver,
            log,
            true,
            Some(*token_id),
        )
        .map(Some),
        // Mint/Unlock observe this chain's own completion of a previously
        // initiated transfer; there is no further intent to enqueue.
        RouterEvent::Mint { .. } | RouterEvent::Unlock { .. } => Ok(None),
        RouterEvent::MemberUpdated { .. } => Ok(None),
    }
}

/// Maps a handler's "canonical" topic onto the read-only mirror the
/// non-validator build publishes instead of signing.
pub fn resolve_topic(topic: Topic, validator_mode: bool) -> Topic {
    if validator_mode {
        return topic;
    }
    match topic {
        Topic::TopicMessageSubmission => Topic::ReadOnlyTransferSave,
        Topic::HederaMintHtsTransfer => Topic::ReadOnlyHederaMintHtsTransfer,
        Topic::HederaFeeTransfer => Topic::ReadOnlyHederaTransfer,
        other => other,
    }
}

fn token_address(token: &[u8; 20]) -> String {
    format!("0x{}", hex::encode(token))
}

fn decode_receiver(target_chain: ChainId, raw: &[u8]) -> Result<String, Reason> {
    if raw.is_empty() {
        return Err(Reason::InvalidReceiver);
    }
    if target_chain.is_hedera() {
        let text = std::str::from_utf8(raw).map_err(|_| Reason::InvalidReceiver)?;
        let account: hiero_sdk::AccountId = text.parse().map_err(|_| Reason::InvalidReceiver)?;
        Ok(account.to_string())
    } else if raw.len() == 20 {
        Ok(format!("0x{}", hex::encode(raw)))
    } else {
        Err(Reason::InvalidReceiver)
    }
}

fn amount_to_decimal(amount: u128) -> Result<Decimal, Reason> {
    Decimal::from_str(&amount.to_string()).map_err(|_| Reason::UnparsableAmount)
}

#[allow(clippy::too_many_arguments)]
fn lock(
    registry: &AssetRegistry,
    source_chain: ChainId,
    target_chain: ChainId,
    token: &[u8; 20],
    amount: u128,
    receiver: &[u8],
    log: &DecodedLog,
) -> Result<(Topic, TransferIntent), Reason> {
    let source_asset = token_address(token);
    let (opposite_chain, opposite_asset) = registry.opposite(source_chain, &source_asset)?;
    if opposite_chain != target_chain {
        return Err(Reason::InvalidReceiver);
    }
    let receiver = decode_receiver(target_chain, receiver)?;
    let normalised = registry.remove_decimals(source_chain, &source_asset, amount_to_decimal(amount)?)?;
    if normalised.is_zero() {
        return Err(Reason::ZeroAmountAfterDecimals);
    }

    let topic = if target_chain.is_hedera() && opposite_asset == HBAR {
        Topic::HederaMintHtsTransfer
    } else {
        Topic::TopicMessageSubmission
    };

    let intent = TransferIntent {
        transaction_id: bridge_types::evm_tx_id(&log.transaction_hash, log.log_index),
        source_chain_id: source_chain,
        target_chain_id: target_chain,
        native_chain_id: source_chain,
        source_asset,
        target_asset: opposite_asset.clone(),
        native_asset: opposite_asset,
        receiver,
        amount: normalised,
        serial_number: None,
        metadata: None,
        is_nft: false,
    };
    Ok((topic, intent))
}

#[allow(clippy::too_many_arguments)]
fn burn(
    registry: &AssetRegistry,
    source_chain: ChainId,
    target_chain: ChainId,
    token: &[u8; 20],
    amount: u128,
    receiver: &[u8],
    log: &DecodedLog,
    is_nft: bool,
    token_id: Option<u128>,
) -> Result<(Topic, TransferIntent), Reason> {
    let source_asset = token_address(token);
    if registry.wrapped_to_wrapped_forbidden(source_chain, target_chain, &source_asset)? {
        return Err(Reason::WrappedToWrappedForbidden);
    }
    let (native_chain, native_asset) = registry.native_of(source_chain, &source_asset)?;
    let receiver = decode_receiver(target_chain, receiver)?;

    let (amount, serial_number) = if is_nft {
        (Decimal::ZERO, token_id.map(|id| id as u64))
    } else {
        let normalised =
            registry.remove_decimals(source_chain, &source_asset, amount_to_decimal(amount)?)?;
        if normalised.is_zero() {
            return Err(Reason::ZeroAmountAfterDecimals);
        }
        (normalised, None)
    };

    let topic = if is_nft && target_chain.is_hedera() {
        Topic::HederaNftTransfer
    } else if !is_nft && target_chain.is_hedera() {
        Topic::HederaFeeTransfer
    } else {
        Topic::TopicMessageSubmission
    };

    let intent = TransferIntent {
        transaction_id: bridge_types::evm_tx_id(&log.transaction_hash, log.log_index),
        source_chain_id: source_chain,
        target_chain_id: target_chain,
        native_chain_id: native_chain,
        source_asset,
        target_asset: native_asset.clone(),
        native_asset,
        receiver,
        amount,
        serial_number,
        metadata: None,
        is_nft,
    };
    Ok((topic, intent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::AssetMapping;

    fn registry() -> AssetRegistry {
        AssetRegistry::load(&[
            AssetMapping {
                chain_id: ChainId(33),
                address: "0x0000000000000000000000000000000000dead".into(),
                opposite_chain_id: ChainId::HEDERA,
                opposite_address: HBAR.into(),
                decimals: 18,
                opposite_decimals: 8,
            },
            AssetMapping {
                chain_id: ChainId(33),
                address: "0x0000000000000000000000000000000000dea1".into(),
                opposite_chain_id: ChainId(77),
                opposite_address: "0x0000000000000000000000000000000000beef".into(),
                decimals: 18,
                opposite_decimals: 18,
            },
        ])
    }

    fn sample_log(event: RouterEvent) -> DecodedLog {
        DecodedLog {
            removed: false,
            block_number: 100,
            log_index: 3,
            transaction_hash: "0xabc".into(),
            event,
        }
    }

    #[test]
    fn lock_to_hedera_hbar_emits_mint_hts_topic() {
        let registry = registry();
        let log = sample_log(RouterEvent::Lock {
            target_chain: ChainId::HEDERA,
            token: {
                let mut t = [0u8; 20];
                t[19] = 0xde;
                t[18] = 0xad;
                t
            },
            amount: 1_000_000_000_000_000_000,
            receiver: b"0.0.12345".to_vec(),
            service_fee: 0,
        });
        let (topic, intent) = handle_event(&registry, ChainId(33), &log).unwrap().unwrap();
        assert_eq!(topic, Topic::HederaMintHtsTransfer);
        assert_eq!(intent.receiver, "0.0.12345");
        assert_eq!(intent.target_asset, HBAR);
    }

    #[test]
    fn lock_with_empty_receiver_is_rejected() {
        let registry = registry();
        let log = sample_log(RouterEvent::Lock {
            target_chain: ChainId::HEDERA,
            token: {
                let mut t = [0u8; 20];
                t[19] = 0xde;
                t[18] = 0xad;
                t
            },
            amount: 1_000_000_000_000_000_000,
            receiver: vec![],
            service_fee: 0,
        });
        let err = handle_event(&registry, ChainId(33), &log).unwrap_err();
        assert_eq!(err, Reason::InvalidReceiver);
    }

    #[test]
    fn lock_with_malformed_hedera_receiver_is_rejected() {
        let registry = registry();
        let log = sample_log(RouterEvent::Lock {
            target_chain: ChainId::HEDERA,
            token: {
                let mut t = [0u8; 20];
                t[19] = 0xde;
                t[18] = 0xad;
                t
            },
            amount: 1_000_000_000_000_000_000,
            receiver: vec![1],
            service_fee: 0,
        });
        let err = handle_event(&registry, ChainId(33), &log).unwrap_err();
        assert_eq!(err, Reason::InvalidReceiver);
    }

    #[test]
    fn burn_targeting_non_native_chain_is_wrapped_to_wrapped_forbidden() {
        let registry = registry();
        let mut wrapped_token = [0u8; 20];
        wrapped_token[19] = 0xef;
        wrapped_token[18] = 0xbe;
        let log = sample_log(RouterEvent::Burn {
            target_chain: ChainId(99),
            token: wrapped_token,
            amount: 100,
            receiver: b"0x0000000000000000000000000000000000cafe".to_vec(),
        });
        // The wrapped token's native chain is 33, so targeting chain 99 is forbidden.
        let err = handle_event(&registry, ChainId(77), &log).unwrap_err();
        assert_eq!(err, Reason::WrappedToWrappedForbidden);
    }

    #[test]
    fn member_updated_produces_no_intent() {
        let registry = registry();
        let log = sample_log(RouterEvent::MemberUpdated {
            member: [0x11; 20],
            added: true,
        });
        assert!(handle_event(&registry, ChainId(33), &log).unwrap().is_none());
    }

    #[test]
    fn resolve_topic_maps_to_read_only_mirror_when_not_validator() {
        assert_eq!(
            resolve_topic(Topic::TopicMessageSubmission, false),
            Topic::ReadOnlyTransferSave
        );
        assert_eq!(
            resolve_topic(Topic::HederaMintHtsTransfer, false),
            Topic::ReadOnlyHederaMintHtsTransfer
        );
        assert_eq!(resolve_topic(Topic::TopicMessageSubmission, true), Topic::TopicMessageSubmission);
    }
}
