//! Pure decode step, split out of the poll loop so it can be tested without
//! a store or bus: memo parse + first-match-wins incoming transfer pick +
//! asset resolution.

use asset_registry::AssetRegistry;
use bridge_types::{ChainId, Topic, TransferIntent};
use hedera_client::{parse_memo, IncomingTransfer, MirrorTransaction};
use rust_decimal::Decimal;

/// Returns `None` for a transaction this watcher correctly ignores: no
/// incoming transfer to the bridge account, a memo that does not parse, an
/// asset not in the registry, or a zero amount after decimal normalisation
/// — all drop-not-error per spec.md §4.5.
pub fn decode_transaction(
    registry: &AssetRegistry,
    bridge_account: &str,
    tx: &MirrorTransaction,
) -> Option<(Topic, TransferIntent)> {
    let incoming = tx.incoming_transfer(bridge_account)?;
    let (target_chain, receiver) = parse_memo(&tx.memo_base64).ok()?;

    let (source_asset, amount, serial_number, is_nft) = match incoming {
        IncomingTransfer::Nft {
            token_id,
            serial_number,
        } => (token_id, Decimal::ZERO, Some(serial_number), true),
        IncomingTransfer::Token { token_id, amount } => {
            (token_id, Decimal::from(amount), None, false)
        }
        IncomingTransfer::Hbar { amount } => {
            (bridge_types::HBAR.to_owned(), Decimal::from(amount), None, false)
        }
    };

    let (opposite_chain, opposite_asset) = registry.opposite(ChainId::HEDERA, &source_asset).ok()?;
    if opposite_chain != target_chain {
        return None;
    }
    // A Hedera-native asset (e.g. HBAR) being sent out needs the validator
    // fee path; a wrapped HTS token being returned needs a burn instead —
    // mirrors `evm-watcher::handlers::burn`'s use of `native_of` for the
    // same distinction on the EVM side.
    let (native_chain_id, native_asset) = registry.native_of(ChainId::HEDERA, &source_asset).ok()?;

    let normalised_amount = if is_nft {
        Decimal::ZERO
    } else {
        let normalised = registry
            .remove_decimals(ChainId::HEDERA, &source_asset, amount)
            .ok()?;
        if normalised.is_zero() {
            return None;
        }
        normalised
    };

    let intent = TransferIntent {
        transaction_id: tx.transaction_id.clone(),
        source_chain_id: ChainId::HEDERA,
        target_chain_id: target_chain,
        native_chain_id,
        source_asset,
        target_asset: opposite_asset,
        native_asset,
        receiver,
        amount: normalised_amount,
        serial_number,
        metadata: None,
        is_nft,
    };
    Some((Topic::TopicMessageSubmission, intent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::AssetMapping;
    use hedera_client::{HbarTransfer, NftTransfer};

    fn registry() -> AssetRegistry {
        AssetRegistry::load(&[AssetMapping {
            chain_id: ChainId::HEDERA,
            address: bridge_types::HBAR.into(),
            opposite_chain_id: ChainId(33),
            opposite_address: "0x0000000000000000000000000000000000dead".into(),
            decimals: 8,
            opposite_decimals: 18,
        }])
    }

    fn memo_for(chain_id: u64, receiver: &str) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(format!("{}-{}", chain_id, receiver))
    }

    fn tx(memo_base64: String, hbar: Vec<HbarTransfer>) -> MirrorTransaction {
        MirrorTransaction {
            transaction_id: "0.0.999-1700000000-000000001".into(),
            consensus_timestamp: "1700000000.000000001".into(),
            memo_base64,
            nft_transfers: vec![],
            token_transfers: vec![],
            transfers: hbar,
        }
    }

    #[test]
    fn decodes_hbar_transfer_with_valid_memo() {
        let registry = registry();
        let memo = memo_for(33, "0x0000000000000000000000000000000000beef");
        let transaction = tx(
            memo,
            vec![HbarTransfer {
                account: "0.0.999".into(),
                amount: 100_000_000,
            }],
        );
        let (topic, intent) = decode_transaction(&registry, "0.0.999", &transaction).unwrap();
        assert_eq!(topic, Topic::TopicMessageSubmission);
        assert_eq!(intent.receiver, "0x0000000000000000000000000000000000beef");
        assert_eq!(intent.target_chain_id, ChainId(33));
        assert_eq!(intent.native_chain_id, ChainId::HEDERA);
    }

    #[test]
    fn returning_a_wrapped_hts_token_reports_its_true_native_chain() {
        let registry = AssetRegistry::load(&[AssetMapping {
            chain_id: ChainId(33),
            address: "0x0000000000000000000000000000000000dead".into(),
            opposite_chain_id: ChainId::HEDERA,
            opposite_address: "0.0.7007".into(),
            decimals: 18,
            opposite_decimals: 0,
        }]);
        let memo = memo_for(33, "0x0000000000000000000000000000000000beef");
        let mut transaction = tx(memo, vec![]);
        transaction.token_transfers = vec![hedera_client::TokenTransfer {
            token_id: "0.0.7007".into(),
            account: "0.0.999".into(),
            amount: 42,
        }];
        let (_, intent) = decode_transaction(&registry, "0.0.999", &transaction).unwrap();
        assert_eq!(intent.native_chain_id, ChainId(33));
        assert_eq!(intent.native_asset, "0x0000000000000000000000000000000000dead");
    }

    #[test]
    fn unparsable_memo_is_ignored_not_errored() {
        let registry = registry();
        let transaction = tx(
            "not valid base64!!".into(),
            vec![HbarTransfer {
                account: "0.0.999".into(),
                amount: 100_000_000,
            }],
        );
        assert!(decode_transaction(&registry, "0.0.999", &transaction).is_none());
    }

    #[test]
    fn transaction_with_no_incoming_transfer_is_ignored() {
        let registry = registry();
        let memo = memo_for(33, "0xabc");
        let transaction = tx(memo, vec![]);
        assert!(decode_transaction(&registry, "0.0.999", &transaction).is_none());
    }

    #[test]
    fn nft_priority_is_respected_even_with_concurrent_hbar_transfer() {
        let registry = AssetRegistry::load(&[
            AssetMapping {
                chain_id: ChainId::HEDERA,
                address: bridge_types::HBAR.into(),
                opposite_chain_id: ChainId(33),
                opposite_address: "0x0000000000000000000000000000000000dead".into(),
                decimals: 8,
                opposite_decimals: 18,
            },
            AssetMapping {
                chain_id: ChainId::HEDERA,
                address: "0.0.5005".into(),
                opposite_chain_id: ChainId(33),
                opposite_address: "0x0000000000000000000000000000000000face".into(),
                decimals: 0,
                opposite_decimals: 0,
            },
        ]);
        let memo = memo_for(33, "0x0000000000000000000000000000000000beef");
        let mut transaction = tx(
            memo,
            vec![HbarTransfer {
                account: "0.0.999".into(),
                amount: 100_000_000,
            }],
        );
        transaction.nft_transfers = vec![NftTransfer {
            token_id: "0.0.5005".into(),
            serial_number: 9,
            receiver_account_id: "0.0.999".into(),
            sender_account_id: None,
        }];
        let (_, intent) = decode_transaction(&registry, "0.0.999", &transaction).unwrap();
        assert!(intent.is_nft);
        assert_eq!(intent.serial_number, Some(9));
    }
}
