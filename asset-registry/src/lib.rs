//! Static bidirectional map between `(chainId, assetAddress)` pairs
//! identifying native/wrapped equivalences, loaded once at boot. Grounded
//! on the per-`Chain` associated `Asset`/`Amount` types in the teacher's
//! `chains.rs`, translated from a compile-time trait hierarchy into a plain
//! runtime map (this registry is populated by config, not by the type
//! system).

use bridge_types::{AssetMapping, ChainId, Reason, HBAR};
use rust_decimal::Decimal;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct AssetKey {
    chain_id: ChainId,
    address: String,
}

impl AssetKey {
    fn new(chain_id: ChainId, address: &str) -> Self {
        AssetKey {
            chain_id,
            address: address.to_owned(),
        }
    }
}

#[derive(Clone, Debug)]
struct AssetEntry {
    opposite_chain_id: ChainId,
    opposite_address: String,
    decimals: u8,
    native_chain_id: ChainId,
    native_address: String,
}

/// Bidirectional native/wrapped asset registry.
pub struct AssetRegistry {
    entries: HashMap<AssetKey, AssetEntry>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        AssetRegistry {
            entries: HashMap::new(),
        }
    }

    /// Loads a declarative set of mappings. Each `AssetMapping` in `rows`
    /// registers both directions plus each side's native-chain pointer;
    /// `opposite(opposite(x)) == x` holds by construction.
    pub fn load(rows: &[AssetMapping]) -> Self {
        let mut registry = Self::new();
        for row in rows {
            registry.insert(row);
        }
        registry
    }

    fn insert(&mut self, row: &AssetMapping) {
        let native_chain_id = row.chain_id;
        let native_address = row.address.clone();

        self.entries.insert(
            AssetKey::new(row.chain_id, &row.address),
            AssetEntry {
                opposite_chain_id: row.opposite_chain_id,
                opposite_address: row.opposite_address.clone(),
                decimals: row.decimals,
                native_chain_id,
                native_address: native_address.clone(),
            },
        );
        self.entries.insert(
            AssetKey::new(row.opposite_chain_id, &row.opposite_address),
            AssetEntry {
                opposite_chain_id: row.chain_id,
                opposite_address: row.address.clone(),
                decimals: row.opposite_decimals,
                native_chain_id,
                native_address,
            },
        );
    }

    /// `opposite(chainId, asset) -> (chainId', asset')`.
    pub fn opposite(&self, chain_id: ChainId, asset: &str) -> Result<(ChainId, String), Reason> {
        let entry = self.lookup(chain_id, asset)?;
        Ok((entry.opposite_chain_id, entry.opposite_address.clone()))
    }

    /// `nativeOf(chainId, asset) -> (chainId*, asset*)`.
    pub fn native_of(&self, chain_id: ChainId, asset: &str) -> Result<(ChainId, String), Reason> {
        let entry = self.lookup(chain_id, asset)?;
        Ok((entry.native_chain_id, entry.native_address.clone()))
    }

    pub fn decimals_of(&self, chain_id: ChainId, asset: &str) -> Result<u8, Reason> {
        Ok(self.lookup(chain_id, asset)?.decimals)
    }

    /// Used by watchers to reject burns whose target chain is not the
    /// asset's native chain (wrapped-to-wrapped transfers are forbidden).
    pub fn wrapped_to_wrapped_forbidden(
        &self,
        chain_id: ChainId,
        target_chain_id: ChainId,
        asset: &str,
    ) -> Result<bool, Reason> {
        let (native_chain_id, _) = self.native_of(chain_id, asset)?;
        Ok(target_chain_id != native_chain_id)
    }

    fn lookup(&self, chain_id: ChainId, asset: &str) -> Result<&AssetEntry, Reason> {
        self.entries
            .get(&AssetKey::new(chain_id, asset))
            .ok_or(Reason::UnknownAsset)
    }

    /// Converts `amount` (in `from_chain`'s decimal resolution) to the
    /// `to_chain`'s resolution. Per spec §4.4, a result of zero is a
    /// caller-level business error (`ZeroAmountAfterDecimals`), not raised
    /// here.
    pub fn remove_decimals(
        &self,
        from_chain: ChainId,
        from_asset: &str,
        amount: Decimal,
    ) -> Result<Decimal, Reason> {
        let from_decimals = self.decimals_of(from_chain, from_asset)? as u32;
        let (to_chain, to_asset) = self.opposite(from_chain, from_asset)?;
        let to_decimals = self.decimals_of(to_chain, &to_asset)? as u32;

        if to_decimals >= from_decimals {
            Ok(amount * Decimal::from(10u64.pow(to_decimals - from_decimals)))
        } else {
            Ok(amount / Decimal::from(10u64.pow(from_decimals - to_decimals)))
        }
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub fn hbar_sentinel() -> &'static str {
    HBAR
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mapping() -> AssetMapping {
        AssetMapping {
            chain_id: ChainId(33),
            address: "0x00000000000000000000000000000000000000".into(),
            opposite_chain_id: ChainId::HEDERA,
            opposite_address: HBAR.into(),
            decimals: 18,
            opposite_decimals: 8,
        }
    }

    #[test]
    fn opposite_is_symmetric() {
        let registry = AssetRegistry::load(&[sample_mapping()]);
        let (c1, a1) = registry
            .opposite(ChainId(33), "0x00000000000000000000000000000000000000")
            .unwrap();
        assert_eq!((c1, a1.as_str()), (ChainId::HEDERA, HBAR));
        let (c2, a2) = registry.opposite(c1, &a1).unwrap();
        assert_eq!(
            (c2, a2.as_str()),
            (ChainId(33), "0x00000000000000000000000000000000000000")
        );
    }

    #[test]
    fn unknown_asset_is_an_error() {
        let registry = AssetRegistry::load(&[sample_mapping()]);
        assert_eq!(
            registry.opposite(ChainId(1), "0xdead"),
            Err(Reason::UnknownAsset)
        );
    }

    #[test]
    fn wrapped_to_wrapped_is_forbidden_when_target_is_not_native() {
        let registry = AssetRegistry::load(&[sample_mapping()]);
        // native chain of the HBAR-side wrapped entry is Hedera (chain 33's asset
        // is native there); targeting a third chain must be forbidden.
        assert!(registry
            .wrapped_to_wrapped_forbidden(ChainId::HEDERA, ChainId(99), HBAR)
            .unwrap());
        assert!(!registry
            .wrapped_to_wrapped_forbidden(ChainId::HEDERA, ChainId(33), HBAR)
            .unwrap());
    }
}
