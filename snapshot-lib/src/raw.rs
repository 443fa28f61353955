//! Records as they are exported from the chain state, and their conversion into the
//! per-address lookup tables consumed by [`crate::resolve`].

use crate::account::{AccountAddress, AccountType, ValidatorAddress};
use crate::address::operator_to_account;
use crate::decimal::{sum, Decimal};
use crate::vote::WeightedVoteOptions;
use crate::Error;
use itertools::Itertools;
use serde::Deserialize;
use std::collections::HashMap;

pub const MODULE_ACCOUNT_TYPE: &str = "/cosmos.auth.v1beta1.ModuleAccount";
pub const INTERCHAIN_ACCOUNT_TYPE: &str =
    "/ibc.applications.interchain_accounts.v1.InterchainAccount";
pub const BONDED_STATUS: &str = "BOND_STATUS_BONDED";

/// Module and interchain accounts are owned by the protocol itself.
pub fn is_protocol_account(account_type: &str) -> bool {
    account_type == MODULE_ACCOUNT_TYPE || account_type == INTERCHAIN_ACCOUNT_TYPE
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RawDelegation {
    pub delegator_address: AccountAddress,
    pub validator_address: ValidatorAddress,
    pub shares: Decimal,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RawVote {
    pub voter: AccountAddress,
    pub options: WeightedVoteOptions,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RawValidator {
    pub operator_address: ValidatorAddress,
    pub tokens: Decimal,
    pub delegator_shares: Decimal,
    pub status: String,
    #[serde(default)]
    pub jailed: bool,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Coin {
    pub denom: String,
    pub amount: Decimal,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RawBalance {
    pub address: AccountAddress,
    pub coins: Vec<Coin>,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
struct BaseAccount {
    address: AccountAddress,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
struct BaseVestingAccount {
    base_account: BaseAccount,
}

/// An entry of the auth module accounts list. Depending on the account type the
/// address is either top level or nested in the embedded base account.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RawAccount {
    #[serde(rename = "@type")]
    pub account_type: AccountType,
    address: Option<AccountAddress>,
    base_account: Option<BaseAccount>,
    base_vesting_account: Option<BaseVestingAccount>,
}

impl RawAccount {
    pub fn address(&self) -> Option<&AccountAddress> {
        self.address
            .as_ref()
            .or_else(|| self.base_account.as_ref().map(|base| &base.address))
            .or_else(|| {
                self.base_vesting_account
                    .as_ref()
                    .map(|vesting| &vesting.base_account.address)
            })
    }
}

/// What the resolver needs to know about an active validator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorGovInfo {
    pub address: ValidatorAddress,
    pub bonded_tokens: Decimal,
    pub delegator_shares: Decimal,
    pub vote: WeightedVoteOptions,
}

pub fn delegations_by_address(
    delegations: Vec<RawDelegation>,
) -> HashMap<AccountAddress, Vec<RawDelegation>> {
    delegations
        .into_iter()
        .into_group_map_by(|delegation| delegation.delegator_address.clone())
}

pub fn votes_by_address(votes: Vec<RawVote>) -> HashMap<AccountAddress, WeightedVoteOptions> {
    votes
        .into_iter()
        .map(|vote| (vote.voter, vote.options))
        .collect()
}

/// Keeps only bonded and unjailed validators, attaching the vote cast by each
/// validator's own account.
pub fn validators_by_address(
    validators: Vec<RawValidator>,
    votes_by_address: &HashMap<AccountAddress, WeightedVoteOptions>,
) -> Result<HashMap<ValidatorAddress, ValidatorGovInfo>, Error> {
    validators
        .into_iter()
        .filter(|validator| validator.status == BONDED_STATUS && !validator.jailed)
        .map(|validator| {
            let account = operator_to_account(&validator.operator_address)?;
            let vote = votes_by_address.get(&account).cloned().unwrap_or_default();
            Ok((
                validator.operator_address.clone(),
                ValidatorGovInfo {
                    address: validator.operator_address,
                    bonded_tokens: validator.tokens,
                    delegator_shares: validator.delegator_shares,
                    vote,
                },
            ))
        })
        .collect()
}

/// Amount of `denom` held by each address. Addresses without any are left out.
pub fn balances_by_address(
    balances: Vec<RawBalance>,
    denom: &str,
) -> Result<HashMap<AccountAddress, Decimal>, Error> {
    let mut by_address = HashMap::with_capacity(balances.len());
    for balance in balances {
        let amount = sum(
            balance
                .coins
                .iter()
                .filter(|coin| coin.denom == denom)
                .map(|coin| coin.amount),
        )?;
        if !amount.is_zero() {
            by_address.insert(balance.address, amount);
        }
    }
    Ok(by_address)
}

pub fn account_types_by_address(
    accounts: Vec<RawAccount>,
) -> Result<HashMap<AccountAddress, AccountType>, Error> {
    accounts
        .into_iter()
        .map(|account| {
            let address = account
                .address()
                .cloned()
                .ok_or_else(|| Error::MissingAddress(account.account_type.clone()))?;
            Ok((address, account.account_type))
        })
        .collect()
}
