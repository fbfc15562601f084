//! Per-chain validator member set. Stands in for the on-chain "Contracts
//! service" member query (`HasValidSignaturesLength`, membership lookup)
//! that spec.md treats as an external dependency rather than one of its own
//! modules — kept as a trait seam so a real implementation can later read
//! the router contract's member list without touching the signature path.

use bridge_types::ChainId;
use std::collections::HashSet;

pub trait MemberRegistry: Send + Sync {
    fn is_member(&self, chain_id: ChainId, address: &str) -> bool;
}

pub struct StaticMemberRegistry {
    members: HashSet<(ChainId, String)>,
}

impl StaticMemberRegistry {
    pub fn new(rows: impl IntoIterator<Item = (ChainId, String)>) -> Self {
        StaticMemberRegistry {
            members: rows
                .into_iter()
                .map(|(chain_id, addr)| (chain_id, addr.to_lowercase()))
                .collect(),
        }
    }
}

impl MemberRegistry for StaticMemberRegistry {
    fn is_member(&self, chain_id: ChainId, address: &str) -> bool {
        self.members.contains(&(chain_id, address.to_lowercase()))
    }
}
