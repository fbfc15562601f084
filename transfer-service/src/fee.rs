//! Fee calculation and member-split distribution for the Hedera-native path
//! (spec.md §4.6/§4.6.1). No teacher analog — the teacher's bridge charges
//! no protocol fee of its own — grounded on
//! `examples/original_source/app/service/fee` (per `_INDEX.md`) for the
//! flat-vs-percentage split and the "clamp to avoid residue" rule.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// `(fee, remainder)` for a fungible Hedera-native transfer.
pub trait FeeService: Send + Sync {
    fn calculate_fee(&self, asset: &str, amount: Decimal) -> (Decimal, Decimal);
}

/// Flat basis-points fee applied to every asset alike.
pub struct PercentageFeeService {
    bps: u32,
}

impl PercentageFeeService {
    pub fn new(bps: u32) -> Self {
        PercentageFeeService { bps }
    }
}

impl FeeService for PercentageFeeService {
    fn calculate_fee(&self, _asset: &str, amount: Decimal) -> (Decimal, Decimal) {
        let fee = (amount * Decimal::from(self.bps) / Decimal::from(10_000u32)).trunc();
        (fee, amount - fee)
    }
}

/// Fixed per-asset flat fee in HBAR for the NFT path.
pub trait NftFeeService: Send + Sync {
    fn flat_fee(&self, asset: &str) -> Decimal;
}

pub struct FlatNftFeeService {
    by_asset: HashMap<String, Decimal>,
    default_fee: Decimal,
}

impl FlatNftFeeService {
    pub fn new(by_asset: HashMap<String, Decimal>, default_fee: Decimal) -> Self {
        FlatNftFeeService { by_asset, default_fee }
    }
}

impl NftFeeService for FlatNftFeeService {
    fn flat_fee(&self, asset: &str) -> Decimal {
        self.by_asset.get(asset).copied().unwrap_or(self.default_fee)
    }
}

/// Splits an already-clamped `fee` evenly across `members`, in Hedera's
/// smallest integer unit (tinybar/HTS base unit). The caller
/// (`ProcessNativeTransfer`) is responsible for clamping via
/// `clamp_to_members` first — by the time this runs, `fee` divides evenly.
pub trait FeeDistributor: Send + Sync {
    fn calculate_member_distribution(&self, fee: Decimal, members: &[String]) -> Vec<(String, Decimal)>;
}

pub struct EqualSplitFeeDistributor;

impl FeeDistributor for EqualSplitFeeDistributor {
    fn calculate_member_distribution(&self, fee: Decimal, members: &[String]) -> Vec<(String, Decimal)> {
        if members.is_empty() {
            return Vec::new();
        }
        let share = fee / Decimal::from(members.len() as u64);
        members.iter().cloned().map(|member| (member, share)).collect()
    }
}

/// Clamps `fee` to the largest integer value divisible by `member_count`
/// with no residue, returning `(clamped, residue)`.
pub fn clamp_to_members(fee: Decimal, member_count: usize) -> (Decimal, Decimal) {
    if member_count == 0 {
        return (Decimal::ZERO, fee);
    }
    let fee_units = fee.trunc().to_i128().unwrap_or(0);
    let divisor = member_count as i128;
    let clamped_units = (fee_units / divisor) * divisor;
    let residue_units = fee_units - clamped_units;
    (Decimal::from(clamped_units), Decimal::from(residue_units))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_fee_splits_amount_into_fee_and_remainder() {
        let service = PercentageFeeService::new(50); // 0.5%
        let (fee, remainder) = service.calculate_fee("HBAR", Decimal::from(10_000));
        assert_eq!(fee, Decimal::from(50));
        assert_eq!(remainder, Decimal::from(9_950));
    }

    #[test]
    fn clamp_removes_residue_not_divisible_by_member_count() {
        let (clamped, residue) = clamp_to_members(Decimal::from(100), 3);
        assert_eq!(clamped, Decimal::from(99));
        assert_eq!(residue, Decimal::from(1));
    }

    #[test]
    fn clamp_is_exact_when_already_divisible() {
        let (clamped, residue) = clamp_to_members(Decimal::from(99), 3);
        assert_eq!(clamped, Decimal::from(99));
        assert_eq!(residue, Decimal::ZERO);
    }

    #[test]
    fn equal_split_distributes_an_already_clamped_total_evenly() {
        let distributor = EqualSplitFeeDistributor;
        let members = vec!["0.0.1".to_owned(), "0.0.2".to_owned(), "0.0.3".to_owned()];
        let splits = distributor.calculate_member_distribution(Decimal::from(99), &members);
        assert_eq!(splits.len(), 3);
        assert!(splits.iter().all(|(_, share)| *share == Decimal::from(33)));
    }

    #[test]
    fn flat_nft_fee_falls_back_to_the_default() {
        let service = FlatNftFeeService::new(HashMap::new(), Decimal::from(5));
        assert_eq!(service.flat_fee("0.0.999"), Decimal::from(5));
    }
}
