//! The router contract's majority rule (spec.md §6): `majorityReached =
//! signatures >= ceil(members * percentage / precision)`, `precision == 0`
//! is a hard error. Grounded on the *shape* of
//! `pallets/cash/src/core.rs::passes_validation_threshold` — its literal
//! `2/3` fraction is specific to the teacher's own on-chain governance and
//! is deliberately not reused; this implements the general formula instead.

use bridge_types::{ChainId, Reason};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdParams {
    pub members: u64,
    pub percentage: u64,
    pub precision: u64,
}

pub trait ThresholdProvider: Send + Sync {
    fn threshold(&self, chain_id: ChainId) -> ThresholdParams;
}

/// Stands in for the target-chain Contracts service's own threshold
/// parameters, refreshed on `MemberUpdated` in a real deployment — a static
/// seam, the same kind used by `message-service::MemberRegistry`.
pub struct StaticThresholdProvider {
    default: ThresholdParams,
}

impl StaticThresholdProvider {
    pub fn new(default: ThresholdParams) -> Self {
        StaticThresholdProvider { default }
    }
}

impl ThresholdProvider for StaticThresholdProvider {
    fn threshold(&self, _chain_id: ChainId) -> ThresholdParams {
        self.default
    }
}

/// `ceil(members * percentage / precision)`. `precision == 0` is `Fatal`,
/// not `Business` — a malformed on-chain config, not a bad message.
pub fn required_signatures(params: ThresholdParams) -> Result<u64, Reason> {
    if params.precision == 0 {
        return Err(Reason::ZeroPrecision);
    }
    let numerator = params.members * params.percentage;
    Ok((numerator + params.precision - 1) / params.precision)
}

pub fn majority_reached(signature_count: u64, params: ThresholdParams) -> Result<bool, Reason> {
    Ok(signature_count >= required_signatures(params)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(members: u64, percentage: u64, precision: u64) -> ThresholdParams {
        ThresholdParams {
            members,
            percentage,
            precision,
        }
    }

    #[test]
    fn ceil_division_rounds_up_a_fractional_requirement() {
        // 5 members, 2/3 majority: ceil(5*2/3) = ceil(10/3) = 4
        assert_eq!(required_signatures(params(5, 2, 3)).unwrap(), 4);
    }

    #[test]
    fn exact_division_does_not_round_up() {
        // 6 members, 2/3 majority: ceil(12/3) = 4
        assert_eq!(required_signatures(params(6, 2, 3)).unwrap(), 4);
    }

    #[test]
    fn zero_precision_is_a_hard_error() {
        assert_eq!(required_signatures(params(5, 2, 0)), Err(Reason::ZeroPrecision));
    }

    #[test]
    fn majority_reached_compares_against_the_ceil_threshold() {
        let p = params(5, 2, 3);
        assert!(!majority_reached(3, p).unwrap());
        assert!(majority_reached(4, p).unwrap());
    }
}
