//! Ethereum-style ECDSA byte-level helpers: keccak hashing, address
//! derivation, hex (de)coding. Ported from the no_std crypto crate's byte
//! handling, without the no_std/codec feature gating (this node is plain
//! std top to bottom).

pub type SignatureBytes = [u8; 65];
pub type AddressBytes = [u8; 20];
pub type PublicKeyBytes = [u8; 64];
pub type HashedMessageBytes = [u8; 32];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CryptoError {
    Unknown,
    KeyNotFound,
    InvalidKeyId,
    ParseError,
    RecoverError,
    HsmError,
    HexDecodeFailed,
    EnvironmentVariablePrivateKeyNotSet,
    EnvironmentVariableHexDecodeFailed,
}

impl std::fmt::Display for CryptoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for CryptoError {}

pub const ETH_MESSAGE_PREAMBLE: &[u8] = b"\x19Ethereum Signed Message:\n";
pub const ETH_ADD_TO_V: u8 = 27u8;

/// Keccak the message in the Ethereum signed-message style (with the
/// `"\x19Ethereum Signed Message:\n<len>"` preamble prepended), or as a bare
/// keccak256 digest when `prepend_preamble` is false.
pub fn eth_keccak_for_signature(input: &[u8], prepend_preamble: bool) -> HashedMessageBytes {
    let mut output = [0u8; 32];
    let mut hasher = tiny_keccak::Keccak::v256();
    use tiny_keccak::Hasher;
    if prepend_preamble {
        hasher.update(ETH_MESSAGE_PREAMBLE);
        hasher.update(format!("{}", input.len()).as_bytes());
    }
    hasher.update(input);
    hasher.finalize(&mut output);
    output
}

pub fn keccak(input: &[u8]) -> HashedMessageBytes {
    let mut output = [0u8; 32];
    let mut hasher = tiny_keccak::Keccak::v256();
    use tiny_keccak::Hasher;
    hasher.update(input);
    hasher.finalize(&mut output);
    output
}

fn tagged_public_key_to_raw(public_key: [u8; 65]) -> PublicKeyBytes {
    let mut raw = [0u8; 64];
    raw.copy_from_slice(&public_key[1..]);
    raw
}

/// Strips the leading `0x04` "uncompressed" tag from a 65-byte public key
/// slice, as returned by AWS KMS's DER-decoded key material.
pub fn tagged_public_key_slice_to_raw(public_key: &[u8]) -> Result<PublicKeyBytes, CryptoError> {
    if public_key.len() != 65 {
        return Err(CryptoError::ParseError);
    }
    let mut raw = [0u8; 64];
    raw.copy_from_slice(&public_key[1..]);
    Ok(raw)
}

pub fn public_key_bytes_to_eth_address(public_key: &PublicKeyBytes) -> AddressBytes {
    let hash = keccak(public_key);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

pub fn public_key_to_bytes(public: libsecp256k1::PublicKey) -> PublicKeyBytes {
    tagged_public_key_to_raw(public.serialize())
}

pub fn public_key_to_eth_address(public: libsecp256k1::PublicKey) -> AddressBytes {
    public_key_bytes_to_eth_address(&public_key_to_bytes(public))
}

pub fn combine_sig_and_recovery(sig: [u8; 64], recovery_term: u8) -> SignatureBytes {
    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&sig);
    out[64] = recovery_term;
    out
}

pub fn eth_decode_hex(message: &str) -> Result<Vec<u8>, CryptoError> {
    let stripped = message.strip_prefix("0x").unwrap_or(message);
    hex::decode(stripped).map_err(|_| CryptoError::HexDecodeFailed)
}

pub fn address_string(address: &AddressBytes) -> String {
    format!("0x{}", hex::encode(address))
}

pub fn str_to_address(addr: &str) -> Option<AddressBytes> {
    let stripped = addr.strip_prefix("0x")?;
    if stripped.len() != 40 {
        return None;
    }
    let bytes = hex::decode(stripped).ok()?;
    bytes.try_into().ok()
}

/// Signs `message` in the Ethereum style and returns the 65-byte `r||s||v`
/// signature.
pub fn eth_sign(
    message: &[u8],
    private_key: &libsecp256k1::SecretKey,
    prepend_preamble: bool,
) -> SignatureBytes {
    let hashed = eth_keccak_for_signature(message, prepend_preamble);
    let msg = libsecp256k1::Message::parse(&hashed);
    let (sig, recovery) = libsecp256k1::sign(&msg, private_key);
    let recovery_term = recovery.serialize() + ETH_ADD_TO_V;
    combine_sig_and_recovery(sig.serialize(), recovery_term)
}

/// Maps a signature's trailing recovery byte to a libsecp256k1 recovery id,
/// accepting the bare `{0,1}`, the `eth_sign` `{27,28}`, and EIP-155
/// `{35..}` encodings.
fn recovery_id_from_v(v: u8) -> Result<u8, CryptoError> {
    match v {
        0..=1 => Ok(v),
        27..=28 => Ok(v - 27),
        35..=255 => Ok(1 - v % 2),
        _ => Err(CryptoError::RecoverError),
    }
}

/// Recovers the signer's address from a 65-byte `r||s||v` signature over
/// `message`. `message` is the raw pre-image, not a digest.
pub fn eth_recover(
    message: &[u8],
    sig: &SignatureBytes,
    prepend_preamble: bool,
) -> Result<AddressBytes, CryptoError> {
    let recovery_id = recovery_id_from_v(sig[64])?;
    let recovery_id =
        libsecp256k1::RecoveryId::parse(recovery_id).map_err(|_| CryptoError::ParseError)?;
    let signature =
        libsecp256k1::Signature::parse_standard_slice(&sig[..64]).map_err(|_| CryptoError::ParseError)?;
    let digest = eth_keccak_for_signature(message, prepend_preamble);
    let msg = libsecp256k1::Message::parse(&digest);
    let recovered = libsecp256k1::recover(&msg, &signature, &recovery_id)
        .map_err(|_| CryptoError::RecoverError)?;
    Ok(public_key_to_eth_address(recovered))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Case {
        address: &'static str,
        private_key: &'static str,
        data: &'static str,
        signature: &'static str,
    }

    // Fixtures from web3.js's eth.accounts.sign test suite.
    fn cases() -> Vec<Case> {
        vec![
            Case {
                address: "0xEB014f8c8B418Db6b45774c326A0E64C78914dC0",
                private_key: "0xbe6383dad004f233317e46ddb46ad31b16064d14447a95cc1d8c8d4bc61c3728",
                data: "Some data",
                signature: "0xa8037a6116c176a25e6fc224947fde9e79a2deaa0dd8b67b366fbdfdbffc01f953e41351267b20d4a89ebfe9c8f03c04de9b345add4a52f15bd026b63c8fb1501b",
            },
            Case {
                address: "0xEB014f8c8B418Db6b45774c326A0E64C78914dC0",
                private_key: "0xbe6383dad004f233317e46ddb46ad31b16064d14447a95cc1d8c8d4bc61c3728",
                data: "Some data!%$$%&@*",
                signature: "0x05252412b097c5d080c994d1ea12abcee6f1cae23feb225517a0b691a66e12866b3f54292f9cfef98f390670b4d010fc4af7fcd46e41d72870602c117b14921c1c",
            },
        ]
    }

    fn decode_hex_unsafe(s: &str) -> Vec<u8> {
        hex::decode(&s.as_bytes()[2..]).unwrap()
    }

    #[test]
    fn eth_sign_matches_web3js_fixtures() {
        for case in cases() {
            let private_key =
                libsecp256k1::SecretKey::parse_slice(&decode_hex_unsafe(case.private_key)).unwrap();
            let sig = eth_sign(case.data.as_bytes(), &private_key, true);
            assert_eq!(sig.to_vec(), decode_hex_unsafe(case.signature));
        }
    }

    #[test]
    fn eth_recover_matches_web3js_fixtures() {
        for case in cases() {
            let sig: SignatureBytes = decode_hex_unsafe(case.signature).try_into().unwrap();
            let address = eth_recover(case.data.as_bytes(), &sig, true).unwrap();
            assert_eq!(address.to_vec(), decode_hex_unsafe(case.address));
        }
    }

    #[test]
    fn address_round_trips_through_string() {
        let addr: AddressBytes = decode_hex_unsafe("0xEB014f8c8B418Db6b45774c326A0E64C78914dC0")
            .try_into()
            .unwrap();
        let s = address_string(&addr);
        assert_eq!(str_to_address(&s).unwrap(), addr);
    }
}
