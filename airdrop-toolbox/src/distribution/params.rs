use super::Error;
use serde::{Deserialize, Serialize};
use snapshot_lib::{AccountAddress, Decimal};
use std::collections::BTreeSet;

/// Multipliers applied to each vote option and the addresses left out of the
/// distribution. Fields missing from a configuration file take their default.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DistributionParams {
    pub yes_multiplier: Decimal,
    pub no_multiplier: Decimal,
    /// Extra reward on top of `no_multiplier` for NoWithVeto votes
    pub bonus: Decimal,
    /// Penalty applied to stake that did not vote and to liquid balances
    pub malus: Decimal,
    /// Size of the new supply relative to the snapshot one
    pub supply_factor: Decimal,
    pub excluded_addresses: BTreeSet<AccountAddress>,
}

impl Default for DistributionParams {
    fn default() -> Self {
        Self {
            yes_multiplier: Decimal::ONE,
            no_multiplier: Decimal::from_integer(4),
            bonus: Decimal::percent(103),
            malus: Decimal::percent(97),
            supply_factor: Decimal::percent(10),
            excluded_addresses: BTreeSet::new(),
        }
    }
}

impl DistributionParams {
    /// Multipliers can not be negative by construction, only an empty supply is
    /// rejected.
    pub fn validate(&self) -> Result<(), Error> {
        if self.supply_factor.is_zero() {
            return Err(Error::InvalidParameter {
                name: "supply_factor",
                value: self.supply_factor,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn is_excluded(&self, address: &str) -> bool {
        self.excluded_addresses.contains(address)
    }
}
