//! ABI definitions and decoding for the six bridge router events. Ported
//! from the teacher's lazy-static event table + topic-hash dispatch idiom.

use bridge_types::ChainId;
use std::convert::TryInto;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RouterEvent {
    Lock {
        target_chain: ChainId,
        token: [u8; 20],
        amount: u128,
        receiver: Vec<u8>,
        service_fee: u128,
    },
    Burn {
        target_chain: ChainId,
        token: [u8; 20],
        amount: u128,
        receiver: Vec<u8>,
    },
    Mint {
        source_chain: ChainId,
        token: [u8; 20],
        amount: u128,
        receiver: [u8; 20],
    },
    Unlock {
        source_chain: ChainId,
        token: [u8; 20],
        amount: u128,
        receiver: [u8; 20],
    },
    BurnErc721 {
        target_chain: ChainId,
        token: [u8; 20],
        token_id: u128,
        receiver: Vec<u8>,
    },
    MemberUpdated {
        member: [u8; 20],
        added: bool,
    },
}

lazy_static::lazy_static! {
    static ref LOCK_EVENT: ethabi::Event = ethabi::Event {
        name: "Lock".into(),
        inputs: vec![
            param("targetChain", ethabi::ParamType::Uint(256)),
            param("token", ethabi::ParamType::Address),
            param("amount", ethabi::ParamType::Uint(256)),
            param("receiver", ethabi::ParamType::Bytes),
            param("serviceFee", ethabi::ParamType::Uint(256)),
        ],
        anonymous: false,
    };
    static ref LOCK_TOPIC: ethabi::Hash = LOCK_EVENT.signature();

    static ref BURN_EVENT: ethabi::Event = ethabi::Event {
        name: "Burn".into(),
        inputs: vec![
            param("targetChain", ethabi::ParamType::Uint(256)),
            param("token", ethabi::ParamType::Address),
            param("amount", ethabi::ParamType::Uint(256)),
            param("receiver", ethabi::ParamType::Bytes),
        ],
        anonymous: false,
    };
    static ref BURN_TOPIC: ethabi::Hash = BURN_EVENT.signature();

    static ref MINT_EVENT: ethabi::Event = ethabi::Event {
        name: "Mint".into(),
        inputs: vec![
            param("sourceChain", ethabi::ParamType::Uint(256)),
            param("token", ethabi::ParamType::Address),
            param("amount", ethabi::ParamType::Uint(256)),
            param("receiver", ethabi::ParamType::Address),
        ],
        anonymous: false,
    };
    static ref MINT_TOPIC: ethabi::Hash = MINT_EVENT.signature();

    static ref UNLOCK_EVENT: ethabi::Event = ethabi::Event {
        name: "Unlock".into(),
        inputs: vec![
            param("sourceChain", ethabi::ParamType::Uint(256)),
            param("token", ethabi::ParamType::Address),
            param("amount", ethabi::ParamType::Uint(256)),
            param("receiver", ethabi::ParamType::Address),
        ],
        anonymous: false,
    };
    static ref UNLOCK_TOPIC: ethabi::Hash = UNLOCK_EVENT.signature();

    static ref BURN_ERC721_EVENT: ethabi::Event = ethabi::Event {
        name: "BurnERC721".into(),
        inputs: vec![
            param("targetChain", ethabi::ParamType::Uint(256)),
            param("token", ethabi::ParamType::Address),
            param("tokenId", ethabi::ParamType::Uint(256)),
            param("receiver", ethabi::ParamType::Bytes),
        ],
        anonymous: false,
    };
    static ref BURN_ERC721_TOPIC: ethabi::Hash = BURN_ERC721_EVENT.signature();

    static ref MEMBER_UPDATED_EVENT: ethabi::Event = ethabi::Event {
        name: "MemberUpdated".into(),
        inputs: vec![
            param("member", ethabi::ParamType::Address),
            param("added", ethabi::ParamType::Bool),
        ],
        anonymous: false,
    };
    static ref MEMBER_UPDATED_TOPIC: ethabi::Hash = MEMBER_UPDATED_EVENT.signature();
}

fn param(name: &str, kind: ethabi::ParamType) -> ethabi::EventParam {
    ethabi::EventParam {
        name: name.into(),
        kind,
        indexed: false,
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EventError {
    UnknownEventTopic,
    ErrorParsingLog,
    InvalidHex,
    InvalidTopic,
    Overflow,
    InvalidLogParams,
}

pub fn decode_hex(data: &str) -> Result<Vec<u8>, EventError> {
    let stripped = data.strip_prefix("0x").ok_or(EventError::InvalidHex)?;
    hex::decode(stripped).map_err(|_| EventError::InvalidHex)
}

pub fn decode_topic(topic: &str) -> Result<ethabi::Hash, EventError> {
    let bytes = decode_hex(topic)?;
    let arr: [u8; 32] = bytes.try_into().map_err(|_| EventError::InvalidTopic)?;
    Ok(arr.into())
}

fn uint_to_u128(token: &ethabi::Token) -> Result<u128, EventError> {
    match token {
        ethabi::Token::Uint(u) => (*u).try_into().map_err(|_| EventError::Overflow),
        _ => Err(EventError::InvalidLogParams),
    }
}

fn address_to_bytes(token: &ethabi::Token) -> Result<[u8; 20], EventError> {
    match token {
        ethabi::Token::Address(a) => Ok((*a).into()),
        _ => Err(EventError::InvalidLogParams),
    }
}

fn bytes_token(token: &ethabi::Token) -> Result<Vec<u8>, EventError> {
    match token {
        ethabi::Token::Bytes(b) => Ok(b.clone()),
        _ => Err(EventError::InvalidLogParams),
    }
}

fn parse_lock(log: ethabi::Log) -> Result<RouterEvent, EventError> {
    let v: Vec<_> = log.params.into_iter().map(|p| p.value).collect();
    match &v[..] {
        [target_chain, token, amount, receiver, service_fee] => Ok(RouterEvent::Lock {
            target_chain: ChainId(uint_to_u128(target_chain)? as u64),
            token: address_to_bytes(token)?,
            amount: uint_to_u128(amount)?,
            receiver: bytes_token(receiver)?,
            service_fee: uint_to_u128(service_fee)?,
        }),
        _ => Err(EventError::InvalidLogParams),
    }
}

fn parse_burn(log: ethabi::Log) -> Result<RouterEvent, EventError> {
    let v: Vec<_> = log.params.into_iter().map(|p| p.value).collect();
    match &v[..] {
        [target_chain, token, amount, receiver] => Ok(RouterEvent::Burn {
            target_chain: ChainId(uint_to_u128(target_chain)? as u64),
            token: address_to_bytes(token)?,
            amount: uint_to_u128(amount)?,
            receiver: bytes_token(receiver)?,
        }),
        _ => Err(EventError::InvalidLogParams),
    }
}

fn parse_mint(log: ethabi::Log) -> Result<RouterEvent, EventError> {
    let v: Vec<_> = log.params.into_iter().map(|p| p.value).collect();
    match &v[..] {
        [source_chain, token, amount, receiver] => Ok(RouterEvent::Mint {
            source_chain: ChainId(uint_to_u128(source_chain)? as u64),
            token: address_to_bytes(token)?,
            amount: uint_to_u128(amount)?,
            receiver: address_to_bytes(receiver)?,
        }),
        _ => Err(EventError::InvalidLogParams),
    }
}

fn parse_unlock(log: ethabi::Log) -> Result<RouterEvent, EventError> {
    let v: Vec<_> = log.params.into_iter().map(|p| p.value).collect();
    match &v[..] {
        [source_chain, token, amount, receiver] => Ok(RouterEvent::Unlock {
            source_chain: ChainId(uint_to_u128(source_chain)? as u64),
            token: address_to_bytes(token)?,
            amount: uint_to_u128(amount)?,
            receiver: address_to_bytes(receiver)?,
        }),
        _ => Err(EventError::InvalidLogParams),
    }
}

fn parse_burn_erc721(log: ethabi::Log) -> Result<RouterEvent, EventError> {
    let v: Vec<_> = log.params.into_iter().map(|p| p.value).collect();
    match &v[..] {
        [target_chain, token, token_id, receiver] => Ok(RouterEvent::BurnErc721 {
            target_chain: ChainId(uint_to_u128(target_chain)? as u64),
            token: address_to_bytes(token)?,
            token_id: uint_to_u128(token_id)?,
            receiver: bytes_token(receiver)?,
        }),
        _ => Err(EventError::InvalidLogParams),
    }
}

fn parse_member_updated(log: ethabi::Log) -> Result<RouterEvent, EventError> {
    let v: Vec<_> = log.params.into_iter().map(|p| p.value).collect();
    match &v[..] {
        [member, added] => Ok(RouterEvent::MemberUpdated {
            member: address_to_bytes(member)?,
            added: match added {
                ethabi::Token::Bool(b) => *b,
                _ => return Err(EventError::InvalidLogParams),
            },
        }),
        _ => Err(EventError::InvalidLogParams),
    }
}

/// Dispatches on the first topic hash, mirroring the teacher's
/// if/else topic-hash chain in `ethereum-client::events::decode_event`.
pub fn decode_event(topics: &[String], data: &str) -> Result<RouterEvent, EventError> {
    let topic_hashes = topics
        .iter()
        .map(|t| decode_topic(t))
        .collect::<Result<Vec<_>, _>>()?;
    let topic_hash = topic_hashes.first().ok_or(EventError::InvalidTopic)?;
    let raw = ethabi::RawLog {
        topics: topic_hashes.clone(),
        data: decode_hex(data)?,
    };

    if *topic_hash == *LOCK_TOPIC {
        parse_lock(LOCK_EVENT.parse_log(raw).map_err(|_| EventError::ErrorParsingLog)?)
    } else if *topic_hash == *BURN_TOPIC {
        parse_burn(BURN_EVENT.parse_log(raw).map_err(|_| EventError::ErrorParsingLog)?)
    } else if *topic_hash == *MINT_TOPIC {
        parse_mint(MINT_EVENT.parse_log(raw).map_err(|_| EventError::ErrorParsingLog)?)
    } else if *topic_hash == *UNLOCK_TOPIC {
        parse_unlock(UNLOCK_EVENT.parse_log(raw).map_err(|_| EventError::ErrorParsingLog)?)
    } else if *topic_hash == *BURN_ERC721_TOPIC {
        parse_burn_erc721(BURN_ERC721_EVENT.parse_log(raw).map_err(|_| EventError::ErrorParsingLog)?)
    } else if *topic_hash == *MEMBER_UPDATED_TOPIC {
        parse_member_updated(MEMBER_UPDATED_EVENT.parse_log(raw).map_err(|_| EventError::ErrorParsingLog)?)
    } else {
        Err(EventError::UnknownEventTopic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic_for(event: &ethabi::Event) -> String {
        format!("0x{}", hex::encode(event.signature().as_bytes()))
    }

    #[test]
    fn decodes_member_updated_event() {
        let topics = vec![topic_for(&MEMBER_UPDATED_EVENT)];
        let data = ethabi::encode(&[
            ethabi::Token::Address([0x11; 20].into()),
            ethabi::Token::Bool(true),
        ]);
        let event = decode_event(&topics, &format!("0x{}", hex::encode(data))).unwrap();
        assert_eq!(
            event,
            RouterEvent::MemberUpdated {
                member: [0x11; 20],
                added: true,
            }
        );
    }

    #[test]
    fn unknown_topic_is_rejected() {
        let topics = vec![format!("0x{}", hex::encode([0u8; 32]))];
        let err = decode_event(&topics, "0x").unwrap_err();
        assert_eq!(err, EventError::UnknownEventTopic);
    }

    #[test]
    fn malformed_hex_is_rejected() {
        let topics = vec!["not-hex".to_string()];
        let err = decode_event(&topics, "0x").unwrap_err();
        assert_eq!(err, EventError::InvalidHex);
    }
}
