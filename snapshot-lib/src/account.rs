use crate::decimal::{sum, Decimal};
use crate::utils::serde::deserialize_null_default;
use crate::vote::WeightedVoteOptions;
use crate::Error;
use serde::{Deserialize, Serialize};

pub type AccountAddress = String;
pub type ValidatorAddress = String;
pub type AccountType = String;

/// Stake of one account in one active validator.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Delegation {
    /// Voting power of the delegation, i.e. shares already converted to tokens.
    pub amount: Decimal,
    pub validator_address: ValidatorAddress,
    /// Vote of the validator, inherited by delegators who did not vote.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub vote: WeightedVoteOptions,
}

/// A governance participant: its balances and how it voted, directly or through
/// its validators.
///
/// `staked_amount` is always the sum of the delegations' amounts.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Account {
    pub address: AccountAddress,
    #[serde(rename = "Type", default)]
    pub account_type: AccountType,
    pub liquid_amount: Decimal,
    pub staked_amount: Decimal,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub vote: WeightedVoteOptions,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub delegations: Vec<Delegation>,
}

impl Account {
    pub fn new(address: AccountAddress, account_type: AccountType) -> Self {
        Self {
            address,
            account_type,
            liquid_amount: Decimal::ZERO,
            staked_amount: Decimal::ZERO,
            vote: WeightedVoteOptions::new(),
            delegations: Vec::new(),
        }
    }

    pub fn has_voted(&self) -> bool {
        !self.vote.is_empty()
    }

    pub fn delegated_amount(&self) -> Result<Decimal, Error> {
        sum(self.delegations.iter().map(|d| d.amount))
    }

    pub(crate) fn push_delegation(&mut self, delegation: Delegation) -> Result<(), Error> {
        self.staked_amount = self.staked_amount.checked_add(delegation.amount)?;
        self.delegations.push(delegation);
        Ok(())
    }
}

#[cfg(any(test, feature = "proptest"))]
mod arbitrary {
    use super::*;
    use crate::vote::{VoteOption, WeightedVoteOption};
    use proptest::prelude::*;

    /// Single option votes, or nothing.
    fn vote_strategy() -> impl Strategy<Value = WeightedVoteOptions> {
        prop_oneof![
            Just(WeightedVoteOptions::new()),
            any::<VoteOption>()
                .prop_filter("empty is never cast", |o| *o != VoteOption::Empty)
                .prop_map(|option| vec![WeightedVoteOption {
                    option,
                    weight: Decimal::ONE,
                }]),
        ]
    }

    impl Arbitrary for Delegation {
        type Parameters = ();
        type Strategy = BoxedStrategy<Delegation>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            (any::<Decimal>(), 0..10u8, vote_strategy())
                .prop_map(|(amount, validator, vote)| Delegation {
                    amount,
                    validator_address: format!("validator{}", validator),
                    vote,
                })
                .boxed()
        }
    }

    impl Arbitrary for Account {
        type Parameters = ();
        type Strategy = BoxedStrategy<Account>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            (
                any::<u32>(),
                any::<Decimal>(),
                vote_strategy(),
                proptest::collection::vec(any::<Delegation>(), 0..4),
            )
                .prop_filter_map("stake overflows", |(id, liquid_amount, vote, delegations)| {
                    let mut account = Account::new(format!("account{}", id), AccountType::new());
                    account.liquid_amount = liquid_amount;
                    account.vote = vote;
                    for delegation in delegations {
                        account.push_delegation(delegation).ok()?;
                    }
                    Some(account)
                })
                .boxed()
        }
    }
}
