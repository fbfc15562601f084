//! AWS KMS-backed keyring. Ported from the teacher's `aws_kms.rs`, with the
//! nested `tokio::runtime::Runtime::block_on` removed: the `Keyring` trait
//! is natively async here, so `sign_one`/`get_public_key` await the KMS
//! client directly.

use crate::keyring::{KeyId, Keyring};
use crate::primitives::{
    combine_sig_and_recovery, eth_keccak_for_signature, tagged_public_key_slice_to_raw,
    CryptoError, PublicKeyBytes, SignatureBytes, ETH_ADD_TO_V,
};
use async_trait::async_trait;
use der_parser::parse_der;
use libsecp256k1::util::{FULL_PUBLIC_KEY_SIZE, TAG_PUBKEY_FULL};
use libsecp256k1::{Message, PublicKey, PublicKeyFormat, RecoveryId, Signature};
use rusoto_core::Region;
use rusoto_kms::{GetPublicKeyRequest, Kms, KmsClient, SignRequest};

const KMS_SIGNING_ALGORITHM_ECDSA_SHA_256: &str = "ECDSA_SHA_256";
const KMS_MESSAGE_TYPE_DIGEST: &str = "DIGEST";

/// Keys held in AWS Key Management Service. Standard AWS environment
/// configuration applies (`AWS_REGION`, credentials via the default chain).
pub struct AwsKmsKeyring {
    client: KmsClient,
}

impl AwsKmsKeyring {
    pub fn new() -> Self {
        AwsKmsKeyring {
            client: KmsClient::new(Region::default()),
        }
    }

    async fn fetch_public_key(&self, key_id: &KeyId) -> Result<PublicKeyBytes, CryptoError> {
        let request = GetPublicKeyRequest {
            key_id: key_id.as_ref().to_owned(),
            ..Default::default()
        };
        let result = self
            .client
            .get_public_key(request)
            .await
            .map_err(|_| CryptoError::KeyNotFound)?;
        let der = result.public_key.ok_or(CryptoError::KeyNotFound)?;
        let (_, decoded) = parse_der(&der).map_err(|_| CryptoError::ParseError)?;
        let sequence = decoded.as_sequence().map_err(|_| CryptoError::ParseError)?;
        if sequence.len() != 2 {
            return Err(CryptoError::ParseError);
        }
        let raw = sequence[1]
            .content
            .as_slice()
            .map_err(|_| CryptoError::ParseError)?;
        if raw.len() != FULL_PUBLIC_KEY_SIZE || raw[0] != TAG_PUBKEY_FULL {
            return Err(CryptoError::ParseError);
        }
        tagged_public_key_slice_to_raw(raw)
    }
}

impl Default for AwsKmsKeyring {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Keyring for AwsKmsKeyring {
    async fn sign_one(&self, message: &[u8], key_id: &KeyId) -> Result<SignatureBytes, CryptoError> {
        let digest = eth_keccak_for_signature(message, false);
        let request = SignRequest {
            key_id: key_id.as_ref().to_owned(),
            message: digest.to_vec().into(),
            message_type: Some(KMS_MESSAGE_TYPE_DIGEST.into()),
            signing_algorithm: KMS_SIGNING_ALGORITHM_ECDSA_SHA_256.into(),
            ..Default::default()
        };
        let public_key = self.fetch_public_key(key_id).await?;
        let response = self
            .client
            .sign(request)
            .await
            .map_err(|_| CryptoError::HsmError)?;
        let der_signature = response.signature.ok_or(CryptoError::HsmError)?.to_vec();
        result_to_signature(&der_signature, &public_key, &digest)
    }

    async fn get_public_key(&self, key_id: &KeyId) -> Result<PublicKeyBytes, CryptoError> {
        self.fetch_public_key(key_id).await
    }
}

/// Normalises a KMS DER signature to the Ethereum 65-byte `r||s||v` form:
/// EIP-2 low-s normalisation, then recovery id found by comparing against
/// the known public key.
fn result_to_signature(
    der_signature: &[u8],
    public_key: &PublicKeyBytes,
    digest: &[u8; 32],
) -> Result<SignatureBytes, CryptoError> {
    let mut sig = Signature::parse_der(der_signature).map_err(|_| CryptoError::ParseError)?;
    if sig.s.is_high() {
        sig.s = -sig.s;
    }

    let public = PublicKey::parse_slice(public_key, Some(PublicKeyFormat::Raw))
        .map_err(|_| CryptoError::ParseError)?;
    let message = Message::parse_slice(digest).map_err(|_| CryptoError::ParseError)?;

    let mut recovery_id = RecoveryId::parse(0).map_err(|_| CryptoError::ParseError)?;
    let recovered =
        libsecp256k1::recover(&message, &sig, &recovery_id).map_err(|_| CryptoError::RecoverError)?;
    if recovered != public {
        recovery_id = RecoveryId::parse(1).map_err(|_| CryptoError::ParseError)?;
    }

    Ok(combine_sig_and_recovery(
        sig.serialize(),
        recovery_id.serialize() + ETH_ADD_TO_V,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_setup() -> (AwsKmsKeyring, KeyId) {
        (
            AwsKmsKeyring::new(),
            KeyId::from("arn:aws:kms:us-east-1:376470027280:key/336459de-d7a4-41a9-a900-ca34a1559daa"),
        )
    }

    // These hit real AWS infrastructure; run only with credentials present.
    #[tokio::test]
    #[ignore]
    async fn get_public_key_returns_nonempty() {
        let (keyring, key_id) = test_setup();
        let pk = keyring.get_public_key(&key_id).await.unwrap();
        assert!(!pk.is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn sign_then_recover_matches_kms_public_key() {
        use crate::primitives::{eth_recover, public_key_bytes_to_eth_address};
        let (keyring, key_id) = test_setup();
        let message = b"hello".to_vec();
        let sig = keyring.sign_one(&message, &key_id).await.unwrap();
        let recovered = eth_recover(&message, &sig, false).unwrap();
        let public_key = keyring.get_public_key(&key_id).await.unwrap();
        assert_eq!(recovered, public_key_bytes_to_eth_address(&public_key));
    }
}
