use serde::{Deserialize, Serialize};

/// Identifies one side of a bridge transfer. Hedera is chain id zero by
/// convention of the router contracts; EVM chains use their real chain id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const HEDERA: ChainId = ChainId(0);

    pub fn is_hedera(self) -> bool {
        self == Self::HEDERA
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(v: u64) -> Self {
        ChainId(v)
    }
}
