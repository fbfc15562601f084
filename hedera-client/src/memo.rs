//! Cross-chain routing memo: base64-encoded `"<targetChainId>-<receiver>"`.

use base64::Engine;
use bridge_types::{ChainId, Reason};

/// Parses a base64-encoded Hedera transaction memo into `(targetChainId,
/// receiver)`. A malformed memo (bad base64, missing separator, non-numeric
/// chain id, or empty receiver) is `BadMemo` — a Decode-class error the
/// caller drops rather than retries.
pub fn parse_memo(memo_base64: &str) -> Result<(ChainId, String), Reason> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(memo_base64)
        .map_err(|_| Reason::BadMemo)?;
    let memo = String::from_utf8(decoded).map_err(|_| Reason::BadMemo)?;

    let (chain_id_str, receiver) = memo.split_once('-').ok_or(Reason::BadMemo)?;
    let chain_id: u64 = chain_id_str.parse().map_err(|_| Reason::BadMemo)?;
    if receiver.is_empty() {
        return Err(Reason::BadMemo);
    }

    Ok((ChainId(chain_id), receiver.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(s: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(s)
    }

    #[test]
    fn parses_valid_memo() {
        // S4: "MC0weHJlY2VpdmVy" decodes to "0-0xreceiver"
        let (chain_id, receiver) = parse_memo("MC0weHJlY2VpdmVy").unwrap();
        assert_eq!(chain_id, ChainId(0));
        assert_eq!(receiver, "0xreceiver");
    }

    #[test]
    fn rejects_missing_separator() {
        assert_eq!(parse_memo(&b64("nodashhere")), Err(Reason::BadMemo));
    }

    #[test]
    fn rejects_non_numeric_chain_id() {
        assert_eq!(parse_memo(&b64("abc-0xreceiver")), Err(Reason::BadMemo));
    }

    #[test]
    fn rejects_empty_receiver() {
        assert_eq!(parse_memo(&b64("33-")), Err(Reason::BadMemo));
    }

    #[test]
    fn rejects_invalid_base64() {
        assert_eq!(parse_memo("not valid base64!!"), Err(Reason::BadMemo));
    }
}
