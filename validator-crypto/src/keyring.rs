use crate::primitives::{
    eth_sign, public_key_to_bytes, CryptoError, PublicKeyBytes, SignatureBytes,
};
use async_trait::async_trait;
use libsecp256k1::SecretKey;
use std::collections::HashMap;
use std::sync::RwLock;

/// Identifies a key in the keyring, opaque to callers: an in-memory label
/// for `InMemoryKeyring`, or an ARN/alias/uuid for `AwsKmsKeyring`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyId(String);

impl From<&str> for KeyId {
    fn from(s: &str) -> Self {
        KeyId(s.to_owned())
    }
}

impl From<String> for KeyId {
    fn from(s: String) -> Self {
        KeyId(s)
    }
}

impl AsRef<str> for KeyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A keyring abstraction over HSM-backed and in-memory signing. The trait is
/// async because the HSM-backed implementation performs network I/O; the
/// node's main loop is async top to bottom so no nested runtime is needed.
#[async_trait]
pub trait Keyring: Send + Sync {
    async fn sign_one(&self, message: &[u8], key_id: &KeyId) -> Result<SignatureBytes, CryptoError>;

    async fn get_public_key(&self, key_id: &KeyId) -> Result<PublicKeyBytes, CryptoError>;
}

/// In-memory keyring for development and tests. Not for production use.
pub struct InMemoryKeyring {
    keys: RwLock<HashMap<String, SecretKey>>,
}

impl InMemoryKeyring {
    pub fn new() -> Self {
        InMemoryKeyring {
            keys: RwLock::new(HashMap::new()),
        }
    }

    pub fn add(&self, key_id: &KeyId, private_key: SecretKey) {
        self.keys
            .write()
            .expect("keyring lock poisoned")
            .insert(key_id.0.clone(), private_key);
    }

    fn get_private_key(&self, key_id: &KeyId) -> Result<SecretKey, CryptoError> {
        self.keys
            .read()
            .expect("keyring lock poisoned")
            .get(&key_id.0)
            .cloned()
            .ok_or(CryptoError::KeyNotFound)
    }
}

impl Default for InMemoryKeyring {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Keyring for InMemoryKeyring {
    async fn sign_one(&self, message: &[u8], key_id: &KeyId) -> Result<SignatureBytes, CryptoError> {
        let private_key = self.get_private_key(key_id)?;
        Ok(eth_sign(message, &private_key, false))
    }

    async fn get_public_key(&self, key_id: &KeyId) -> Result<PublicKeyBytes, CryptoError> {
        let private_key = self.get_private_key(key_id)?;
        let public = libsecp256k1::PublicKey::from_secret_key(&private_key);
        Ok(public_key_to_bytes(public))
    }
}
