//! Signs and verifies the authorisation payload exchanged on the consensus
//! topic (spec.md §4.7). Grounded on
//! `pallets/cash/src/internal/events.rs::receive_event`'s
//! recover-then-check-membership sequence, generalized from a single
//! in-runtime call into an async service over a real keyring and store.

mod consensus_topic;
mod members;
mod metrics;
mod payload;

pub use consensus_topic::{ConsensusTopic, LoopbackConsensusTopic};
pub use members::{MemberRegistry, StaticMemberRegistry};
pub use payload::{effective_amount, encode_for_transfer};

use bridge_types::{Reason, SignatureMessage, Transfer};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use transfer_store::TransferStore;
use validator_crypto::{eth_recover, keccak, KeyId, Keyring};

const TRANSFER_POLL_INTERVAL: Duration = Duration::from_secs(5);

pub struct MessageService {
    store: TransferStore,
    keyring: Arc<dyn Keyring>,
    key_id: KeyId,
    members: Arc<dyn MemberRegistry>,
}

impl MessageService {
    pub fn new(
        store: TransferStore,
        keyring: Arc<dyn Keyring>,
        key_id: KeyId,
        members: Arc<dyn MemberRegistry>,
    ) -> Self {
        MessageService {
            store,
            keyring,
            key_id,
            members,
        }
    }

    /// Signs `transfer`'s canonical payload and returns the envelope ready
    /// to publish to the consensus topic.
    pub async fn sign_message(&self, transfer: &Transfer) -> Result<SignatureMessage, Reason> {
        let payload = encode_for_transfer(transfer);
        let signature = self
            .keyring
            .sign_one(&payload, &self.key_id)
            .await
            .map_err(|_| Reason::InvalidSignature)?;
        let public_key = self
            .keyring
            .get_public_key(&self.key_id)
            .await
            .map_err(|_| Reason::InvalidSignature)?;
        let signer = validator_crypto::public_key_bytes_to_eth_address(&public_key);
        let hash = hex::encode(keccak(&payload));
        Ok(SignatureMessage {
            transfer_id: transfer.transaction_id.clone(),
            signature: format!("0x{}", hex::encode(signature)),
            hash,
            signer: format!("0x{}", hex::encode(signer)),
            transaction_timestamp: Utc::now(),
        })
    }

    /// Re-derives the expected payload hash from the persisted transfer and
    /// checks it against `message.hash`. `SanityCheckSignature` may arrive
    /// before the transfer is persisted (or, for a Hedera native, before its
    /// fee is assigned): poll the store at a fixed interval until it
    /// appears. The poll is bounded only by the caller's own cancellation.
    pub async fn sanity_check_signature(&self, message: &SignatureMessage) -> Result<Transfer, Reason> {
        loop {
            match self.store.get_by_tx_id(&message.transfer_id).await? {
                Some(transfer) if transfer.fee_required() && transfer.fee.is_none() => {
                    tokio::time::sleep(TRANSFER_POLL_INTERVAL).await;
                }
                Some(transfer) => {
                    let expected = encode_for_transfer(&transfer);
                    let expected_hash = hex::encode(keccak(&expected));
                    if expected_hash != message.hash {
                        return Err(Reason::InvalidSignature);
                    }
                    return Ok(transfer);
                }
                None => tokio::time::sleep(TRANSFER_POLL_INTERVAL).await,
            }
        }
    }

    /// Validates, deduplicates, recovers the signer, checks membership, and
    /// persists `message`. The target chain checked for membership is the
    /// transfer's `target_chain_id` — the chain whose router will eventually
    /// consume this signature.
    pub async fn process_signature(&self, message: SignatureMessage) -> Result<(), Reason> {
        let transfer = self.sanity_check_signature(&message).await?;

        let payload = encode_for_transfer(&transfer);
        let sig_bytes = decode_signature(&message.signature)?;
        let recovered = eth_recover(&payload, &sig_bytes, false).map_err(|_| Reason::InvalidSignature)?;
        let recovered_address = format!("0x{}", hex::encode(recovered));

        if recovered_address.to_lowercase() != message.signer.to_lowercase() {
            return Err(Reason::InvalidSignature);
        }
        if !self
            .members
            .is_member(transfer.target_chain_id, &recovered_address)
        {
            return Err(Reason::UnknownValidator);
        }

        self.store.insert_signature(&message).await?;
        metrics::record_signature_received(transfer.target_chain_id.0);
        Ok(())
    }
}

fn decode_signature(hex_sig: &str) -> Result<[u8; 65], Reason> {
    let bytes = hex::decode(hex_sig.trim_start_matches("0x")).map_err(|_| Reason::InvalidSignature)?;
    bytes.try_into().map_err(|_| Reason::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::{ChainId as CID, TransferStatus};
    use rust_decimal::Decimal;
    use validator_crypto::InMemoryKeyring;

    fn sample_transfer() -> Transfer {
        Transfer {
            transaction_id: "0xabc-0".into(),
            source_chain_id: CID(33),
            target_chain_id: CID::HEDERA,
            native_chain_id: CID(33),
            source_asset: "0xdead".into(),
            target_asset: "HBAR".into(),
            native_asset: "0xdead".into(),
            receiver: "0.0.999".into(),
            amount: Decimal::from(100),
            serial_number: None,
            metadata: None,
            fee: None,
            is_nft: false,
            status: TransferStatus::Initiated,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn effective_amount_subtracts_fee_only_for_hedera_native() {
        let mut transfer = sample_transfer();
        transfer.native_chain_id = CID::HEDERA;
        transfer.amount = Decimal::from(100);
        transfer.fee = Some(Decimal::from(5));
        assert_eq!(effective_amount(&transfer), Decimal::from(95));

        transfer.native_chain_id = CID(33);
        assert_eq!(effective_amount(&transfer), Decimal::from(100));
    }

    #[tokio::test]
    async fn sign_message_produces_a_hash_matching_the_payload() {
        let keyring = InMemoryKeyring::new();
        let key_id = KeyId::from("validator-0");
        keyring.add(
            &key_id,
            libsecp256k1::SecretKey::parse_slice(
                &hex::decode("be6383dad004f233317e46ddb46ad31b16064d14447a95cc1d8c8d4bc61c372").unwrap(),
            )
            .unwrap(),
        );
        let transfer = sample_transfer();
        let payload = encode_for_transfer(&transfer);
        let expected_hash = hex::encode(keccak(&payload));
        let signature = keyring.sign_one(&payload, &key_id).await.unwrap();
        assert_eq!(hex::encode(signature).len(), 130);
        assert_eq!(expected_hash.len(), 64);
    }
}
