//! Development keyring: an in-memory keyring loaded with a key taken from
//! the environment, falling back to a well-known testnet key. Never use in
//! production — see `AwsKmsKeyring` for that.

use crate::keyring::{InMemoryKeyring, KeyId};
use crate::primitives::eth_decode_hex;
use libsecp256k1::SecretKey;
use log::warn;

const ETH_KEY_ID_ENV_VAR: &str = "ETH_KEY_ID";
const ETH_KEY_ID_DEV_DEFAULT: &str = "my_eth_key_id";
const ETH_PRIVATE_KEY_ENV_VAR: &str = "ETH_KEY";
const ETH_PRIVATE_KEY_DEFAULT_VALUE: &str =
    "50f05592dc31bfc65a77c4cc80f2764ba8f9a7cce29c94a51fe2d70cb5599374";

fn private_key_from_env() -> Option<SecretKey> {
    let raw = std::env::var(ETH_PRIVATE_KEY_ENV_VAR).ok()?;
    if raw.is_empty() {
        return None;
    }
    let bytes = eth_decode_hex(&raw).expect("ETH_KEY must be valid hex");
    Some(SecretKey::parse_slice(&bytes).expect("ETH_KEY must be a valid secp256k1 private key"))
}

/// Builds the development keyring. Panics on a malformed `ETH_KEY` — this is
/// only ever called once at process start-up.
pub fn dev_keyring() -> InMemoryKeyring {
    let key_id: KeyId = std::env::var(ETH_KEY_ID_ENV_VAR)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| ETH_KEY_ID_DEV_DEFAULT.to_owned())
        .into();

    let private_key = match private_key_from_env() {
        Some(key) => key,
        None => {
            warn!("ETH_KEY not set, falling back to the well-known dev signing key");
            let default = hex::decode(ETH_PRIVATE_KEY_DEFAULT_VALUE).unwrap();
            SecretKey::parse_slice(&default).unwrap()
        }
    };

    let keyring = InMemoryKeyring::new();
    keyring.add(&key_id, private_key);
    keyring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyring::Keyring;

    #[tokio::test]
    async fn dev_keyring_signs_with_default_key_when_env_unset() {
        std::env::remove_var(ETH_PRIVATE_KEY_ENV_VAR);
        std::env::remove_var(ETH_KEY_ID_ENV_VAR);
        let keyring = dev_keyring();
        let key_id: KeyId = ETH_KEY_ID_DEV_DEFAULT.into();
        let sig = keyring.sign_one(b"hi", &key_id).await.unwrap();
        assert_eq!(sig.len(), 65);
    }
}
