use crate::account::{Account, AccountAddress, AccountType, Delegation, ValidatorAddress};
use crate::address;
use crate::decimal::Decimal;
use crate::raw::{is_protocol_account, RawDelegation, ValidatorGovInfo};
use crate::vote::WeightedVoteOptions;
use crate::Error;
use std::collections::HashMap;

/// Tokens backing `shares` of the validator's delegator shares.
fn voting_power(shares: Decimal, validator: &ValidatorGovInfo) -> Result<Decimal, Error> {
    if validator.delegator_shares.is_zero() {
        return Err(Error::ZeroDelegatorShares(validator.address.clone()));
    }
    shares
        .checked_mul(validator.bonded_tokens)?
        .checked_div(validator.delegator_shares)
}

/// Builds the list of accounts taking part in the distribution, with their
/// balances, their own vote and the votes of the validators they delegate to.
///
/// Delegations to validators missing from `validators_by_address` (not in the
/// active set, or jailed) do not count. Module and interchain accounts are left
/// out entirely. The result is sorted by address.
pub fn resolve(
    delegations_by_address: &HashMap<AccountAddress, Vec<RawDelegation>>,
    votes_by_address: &HashMap<AccountAddress, WeightedVoteOptions>,
    validators_by_address: &HashMap<ValidatorAddress, ValidatorGovInfo>,
    balances_by_address: &HashMap<AccountAddress, Decimal>,
    account_types_by_address: &HashMap<AccountAddress, AccountType>,
) -> Result<Vec<Account>, Error> {
    let type_of = |address: &AccountAddress| {
        account_types_by_address
            .get(address)
            .cloned()
            .unwrap_or_default()
    };

    let mut accounts: HashMap<AccountAddress, Account> =
        HashMap::with_capacity(delegations_by_address.len());
    let mut skipped_delegations = 0usize;

    for (addr, delegations) in delegations_by_address {
        address::validate(addr)?;
        let account_type = type_of(addr);
        if is_protocol_account(&account_type) {
            continue;
        }

        let mut account = Account::new(addr.clone(), account_type);
        account.vote = votes_by_address.get(addr).cloned().unwrap_or_default();

        for delegation in delegations {
            address::validate(&delegation.validator_address)?;
            let validator = match validators_by_address.get(&delegation.validator_address) {
                Some(validator) => validator,
                None => {
                    skipped_delegations += 1;
                    continue;
                }
            };

            account.push_delegation(Delegation {
                amount: voting_power(delegation.shares, validator)?,
                validator_address: validator.address.clone(),
                vote: validator.vote.clone(),
            })?;
        }
        accounts.insert(addr.clone(), account);
    }

    for (addr, balance) in balances_by_address {
        if let Some(account) = accounts.get_mut(addr) {
            account.liquid_amount = *balance;
            continue;
        }

        address::validate(addr)?;
        let account_type = type_of(addr);
        if is_protocol_account(&account_type) {
            continue;
        }
        let mut account = Account::new(addr.clone(), account_type);
        account.liquid_amount = *balance;
        accounts.insert(addr.clone(), account);
    }

    log::debug!(
        "{} delegations to inactive validators ignored",
        skipped_delegations
    );

    let mut accounts = accounts.into_values().collect::<Vec<_>>();
    accounts.sort_by(|a, b| a.address.cmp(&b.address));
    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::tests::{account_address, operator_address};
    use crate::dec;
    use crate::raw::{INTERCHAIN_ACCOUNT_TYPE, MODULE_ACCOUNT_TYPE};
    use crate::vote::{VoteOption, WeightedVoteOption};
    use proptest::prelude::*;
    use test_strategy::proptest;

    #[derive(Default)]
    struct Fixture {
        delegations: HashMap<AccountAddress, Vec<RawDelegation>>,
        votes: HashMap<AccountAddress, WeightedVoteOptions>,
        validators: HashMap<ValidatorAddress, ValidatorGovInfo>,
        balances: HashMap<AccountAddress, Decimal>,
        account_types: HashMap<AccountAddress, AccountType>,
    }

    impl Fixture {
        fn delegate(&mut self, delegator: &str, validator: &str, shares: Decimal) -> &mut Self {
            self.delegations
                .entry(delegator.to_string())
                .or_default()
                .push(RawDelegation {
                    delegator_address: delegator.to_string(),
                    validator_address: validator.to_string(),
                    shares,
                });
            self
        }

        fn validator(
            &mut self,
            address: &str,
            bonded_tokens: Decimal,
            delegator_shares: Decimal,
            vote: WeightedVoteOptions,
        ) -> &mut Self {
            self.validators.insert(
                address.to_string(),
                ValidatorGovInfo {
                    address: address.to_string(),
                    bonded_tokens,
                    delegator_shares,
                    vote,
                },
            );
            self
        }

        fn resolve(&self) -> Result<Vec<Account>, Error> {
            resolve(
                &self.delegations,
                &self.votes,
                &self.validators,
                &self.balances,
                &self.account_types,
            )
        }
    }

    fn single(option: VoteOption) -> WeightedVoteOptions {
        vec![WeightedVoteOption {
            option,
            weight: Decimal::ONE,
        }]
    }

    #[test]
    fn no_delegation() {
        assert!(Fixture::default().resolve().unwrap().is_empty());
    }

    #[test]
    fn delegation_to_inactive_validator() {
        let delegator = account_address(1);
        let accounts = Fixture::default()
            .delegate(&delegator, &operator_address(1), dec!(1000))
            .resolve()
            .unwrap();
        assert_eq!(accounts, vec![Account::new(delegator, AccountType::new())]);
    }

    #[test]
    fn nobody_voted() {
        let delegator = account_address(1);
        let validator = operator_address(1);
        let accounts = Fixture::default()
            .delegate(&delegator, &validator, dec!(1000))
            .validator(&validator, dec!(1000000), dec!(1000000), vec![])
            .resolve()
            .unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].staked_amount, dec!(1000));
        assert!(!accounts[0].has_voted());
        assert_eq!(
            accounts[0].delegations,
            vec![Delegation {
                amount: dec!(1000),
                validator_address: validator,
                vote: vec![],
            }]
        );
    }

    #[test]
    fn shares_are_converted_to_tokens() {
        // a slashed validator: 1000 shares backed by 900 tokens
        let delegator = account_address(1);
        let validator = operator_address(1);
        let accounts = Fixture::default()
            .delegate(&delegator, &validator, dec!(100))
            .validator(&validator, dec!(900), dec!(1000), vec![])
            .resolve()
            .unwrap();
        assert_eq!(accounts[0].staked_amount, dec!(90));

        let accounts = Fixture::default()
            .delegate(&delegator, &validator, dec!(1))
            .validator(&validator, dec!(2), dec!(3), vec![])
            .resolve()
            .unwrap();
        assert_eq!(accounts[0].staked_amount, dec!(0.666666666666666666));
    }

    #[test]
    fn inherit_validator_vote() {
        let delegator = account_address(1);
        let (validator1, validator2) = (operator_address(1), operator_address(2));
        let accounts = Fixture::default()
            .delegate(&delegator, &validator1, dec!(1000))
            .delegate(&delegator, &validator2, dec!(500))
            .delegate(&delegator, &operator_address(3), dec!(42))
            .validator(&validator1, dec!(1000000), dec!(1000000), single(VoteOption::Yes))
            .validator(&validator2, dec!(1000000), dec!(1000000), single(VoteOption::No))
            .resolve()
            .unwrap();

        let account = &accounts[0];
        assert!(!account.has_voted());
        assert_eq!(account.staked_amount, dec!(1500));
        assert_eq!(account.delegations.len(), 2);
        assert_eq!(account.delegations[0].vote, single(VoteOption::Yes));
        assert_eq!(account.delegations[1].vote, single(VoteOption::No));
    }

    #[test]
    fn direct_vote() {
        let delegator = account_address(1);
        let validator = operator_address(1);
        let mut fixture = Fixture::default();
        fixture
            .delegate(&delegator, &validator, dec!(1000))
            .validator(&validator, dec!(1000000), dec!(1000000), single(VoteOption::Yes));
        fixture
            .votes
            .insert(delegator.clone(), single(VoteOption::Abstain));
        let accounts = fixture.resolve().unwrap();
        assert_eq!(accounts[0].vote, single(VoteOption::Abstain));
        assert_eq!(accounts[0].delegations[0].vote, single(VoteOption::Yes));
    }

    #[test]
    fn balances() {
        let (delegator, holder) = (account_address(1), account_address(2));
        let validator = operator_address(1);
        let mut fixture = Fixture::default();
        fixture
            .delegate(&delegator, &validator, dec!(10))
            .validator(&validator, dec!(10), dec!(10), vec![]);
        fixture.balances.insert(delegator.clone(), dec!(5));
        fixture.balances.insert(holder.clone(), dec!(7));

        let accounts = fixture.resolve().unwrap();
        let by_address = accounts
            .iter()
            .map(|account| (account.address.clone(), account))
            .collect::<HashMap<_, _>>();
        assert_eq!(accounts.len(), 2);
        assert_eq!(by_address[&delegator].liquid_amount, dec!(5));
        assert_eq!(by_address[&delegator].staked_amount, dec!(10));
        assert_eq!(by_address[&holder].liquid_amount, dec!(7));
        assert_eq!(by_address[&holder].staked_amount, Decimal::ZERO);
        assert!(by_address[&holder].delegations.is_empty());
    }

    #[test]
    fn protocol_accounts_are_ignored() {
        let (module, ica, regular) = (account_address(1), account_address(2), account_address(3));
        let validator = operator_address(1);
        let mut fixture = Fixture::default();
        fixture
            .delegate(&module, &validator, dec!(10))
            .delegate(&ica, &validator, dec!(10))
            .validator(&validator, dec!(10), dec!(10), vec![]);
        for address in [&module, &ica, &regular] {
            fixture.balances.insert(address.clone(), dec!(1));
        }
        fixture
            .account_types
            .insert(module, MODULE_ACCOUNT_TYPE.to_string());
        fixture
            .account_types
            .insert(ica, INTERCHAIN_ACCOUNT_TYPE.to_string());
        fixture.account_types.insert(
            regular.clone(),
            "/cosmos.auth.v1beta1.BaseAccount".to_string(),
        );

        let accounts = fixture.resolve().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].address, regular);
        assert_eq!(accounts[0].account_type, "/cosmos.auth.v1beta1.BaseAccount");
    }

    #[test]
    fn malformed_addresses_are_fatal() {
        let result = Fixture::default()
            .delegate("not an address", &operator_address(1), dec!(1))
            .resolve();
        assert!(matches!(result, Err(Error::InvalidAddress { .. })));

        let result = Fixture::default()
            .delegate(&account_address(1), "cosmosvaloper1broken", dec!(1))
            .resolve();
        assert!(matches!(result, Err(Error::InvalidAddress { .. })));

        let mut fixture = Fixture::default();
        fixture.balances.insert("garbage".to_string(), dec!(1));
        assert!(matches!(
            fixture.resolve(),
            Err(Error::InvalidAddress { .. })
        ));
    }

    #[test]
    fn validator_without_shares_is_fatal() {
        let validator = operator_address(1);
        let result = Fixture::default()
            .delegate(&account_address(1), &validator, dec!(1))
            .validator(&validator, dec!(10), Decimal::ZERO, vec![])
            .resolve();
        assert!(matches!(result, Err(Error::ZeroDelegatorShares(_))));
    }

    #[test]
    fn chain_magnitudes_keep_every_digit() {
        // 12.3M ATOM in uatom, on a validator slashed by a third
        let delegator = account_address(1);
        let validator = operator_address(1);
        let accounts = Fixture::default()
            .delegate(&delegator, &validator, dec!(12345678901234.567890123456789012))
            .validator(
                &validator,
                dec!(98765432109876),
                dec!(148148148164814.000000000000000000),
                vec![],
            )
            .resolve()
            .unwrap();
        assert_eq!(
            accounts[0].staked_amount,
            dec!(8230452600823.045260082304526008)
        );
    }

    #[test]
    fn overflowing_stake_is_an_error() {
        let validator = operator_address(1);
        let huge = "1".repeat(31).parse::<Decimal>().unwrap();
        let result = Fixture::default()
            .delegate(&account_address(1), &validator, huge)
            .validator(&validator, huge, huge, vec![])
            .resolve();
        assert!(matches!(result, Err(Error::Overflow)));
    }

    #[test]
    fn sorted_by_address() {
        let mut fixture = Fixture::default();
        for seed in [9u8, 3, 200, 0] {
            fixture.balances.insert(account_address(seed), dec!(1));
        }
        let accounts = fixture.resolve().unwrap();
        assert!(accounts
            .windows(2)
            .all(|pair| pair[0].address < pair[1].address));
    }

    fn delegations_strategy() -> impl Strategy<Value = Vec<(u8, u8, u64)>> {
        proptest::collection::vec((0..8u8, 0..6u8, 1..1_000_000_000u64), 0..40)
    }

    /// Validators with seeds 0..4 are active, the others are not.
    #[proptest]
    fn staked_amount_is_sum_of_counted_delegations(
        #[strategy(delegations_strategy())] delegations: Vec<(u8, u8, u64)>,
    ) {
        let mut fixture = Fixture::default();
        for seed in 0..4u8 {
            fixture.validator(
                &operator_address(seed),
                Decimal::from_integer(1_000_000 + u128::from(seed) * 7),
                Decimal::from_integer(1_000_000 + u128::from(seed) * 11),
                single(VoteOption::Yes),
            );
        }
        for (delegator, validator, shares) in &delegations {
            fixture.delegate(
                &account_address(*delegator),
                &operator_address(*validator),
                Decimal::from_integer(u128::from(*shares)),
            );
        }

        let accounts = fixture.resolve().unwrap();
        for account in &accounts {
            assert_eq!(account.staked_amount, account.delegated_amount().unwrap());
            assert!(account
                .delegations
                .iter()
                .all(|d| fixture.validators.contains_key(&d.validator_address)));
            let expected = delegations
                .iter()
                .filter(|(delegator, validator, _)| {
                    account_address(*delegator) == account.address && *validator < 4
                })
                .count();
            assert_eq!(account.delegations.len(), expected);
        }
    }
}
