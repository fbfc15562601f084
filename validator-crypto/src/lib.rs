//! Signer abstraction for the validator: Ethereum-style ECDSA signing and
//! recovery, with an in-memory dev keyring and an AWS KMS-backed keyring.

pub mod dev;
pub mod keyring;
pub mod primitives;

#[cfg(feature = "aws-kms")]
pub mod aws_kms;

pub use keyring::{InMemoryKeyring, KeyId, Keyring};
pub use primitives::{
    address_string, eth_recover, eth_sign, keccak, public_key_bytes_to_eth_address, str_to_address,
    AddressBytes, CryptoError, PublicKeyBytes, SignatureBytes,
};

/// Selects a keyring implementation based on the `KEYRING_TYPE` environment
/// variable: `"AWS_KMS"` for production, otherwise the development keyring.
pub fn keyring() -> Box<dyn Keyring> {
    #[cfg(feature = "aws-kms")]
    {
        if std::env::var("KEYRING_TYPE").as_deref() == Ok("AWS_KMS") {
            return Box::new(aws_kms::AwsKmsKeyring::new());
        }
    }
    Box::new(dev::dev_keyring())
}
