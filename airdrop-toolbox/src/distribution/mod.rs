mod params;

pub use params::DistributionParams;

use serde::Serialize;
use snapshot_lib::decimal::{product, sum};
use snapshot_lib::{Account, AccountAddress, Decimal, VoteMap, VoteOption};
use std::collections::BTreeMap;
use thiserror::Error;

pub type Award = u128;

/// Largest share of the distributed supply that may end up with accounts that did
/// not take part in the vote (abstained, did not vote, or did not stake).
pub const NON_VOTERS_TARGET: Decimal = Decimal::percent(33);

// 1 - NON_VOTERS_TARGET
const VOTERS_TARGET: Decimal = Decimal::percent(67);

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid value {value} for parameter {name}")]
    InvalidParameter { name: &'static str, value: Decimal },
    #[error("award for {0} overflows")]
    Overflow(AccountAddress),
    #[error(transparent)]
    Arithmetic(#[from] snapshot_lib::Error),
}

/// How an amount of some token is split among vote options.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Distrib {
    pub supply: Decimal,
    pub votes: VoteMap,
    /// Liquid balances, which are part of `supply` but not of `votes`
    pub unstaked: Decimal,
}

impl Distrib {
    /// Share of the supply represented by `amount`, `None` if the supply is empty.
    pub fn percentage(&self, amount: Decimal) -> Option<Decimal> {
        amount.checked_div(self.supply).ok()
    }

    /// Share of the supply that went to each vote option.
    pub fn percentages(&self) -> Option<VoteMap> {
        self.votes.percentages_of(self.supply)
    }

    fn add_supply(&mut self, staked: Decimal, unstaked: Decimal) -> Result<(), Error> {
        self.supply = sum([self.supply, staked, unstaked])?;
        self.unstaked = self.unstaked.checked_add(unstaked)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Airdrop {
    pub addresses: BTreeMap<AccountAddress, Award>,
    pub non_voters_multiplier: Decimal,
    /// Snapshot token
    pub atom: Distrib,
    /// Distributed token
    pub atone: Distrib,
    /// Snapshot amount held by excluded addresses
    pub icf_slash: Decimal,
}

/// Splits the account's stake among vote options, each weight being the fraction
/// of the stake that voted for that option. The weights add up to one.
///
/// A direct vote takes precedence. Otherwise each delegation carries the vote of
/// its validator, stake delegated to validators that did not vote counts as
/// [`VoteOption::Empty`].
pub fn vote_weights(account: &Account) -> Result<VoteMap, Error> {
    let mut weights = VoteMap::new();
    if account.staked_amount.is_zero() {
        weights.add(VoteOption::Empty, Decimal::ONE)?;
    } else if account.has_voted() {
        for option in &account.vote {
            weights.add(option.option, option.weight)?;
        }
    } else {
        for delegation in &account.delegations {
            let share = delegation.amount.checked_div(account.staked_amount)?;
            if delegation.vote.is_empty() {
                weights.add(VoteOption::Empty, share)?;
                continue;
            }
            for option in &delegation.vote {
                weights.add(option.option, option.weight.checked_mul(share)?)?;
            }
        }
    }
    Ok(weights)
}

fn snapshot_distribution(accounts: &[Account], weights: &[VoteMap]) -> Result<Distrib, Error> {
    let mut atom = Distrib::default();
    for (account, weights) in accounts.iter().zip(weights) {
        for (option, weight) in weights.iter() {
            atom.votes
                .add(option, weight.checked_mul(account.staked_amount)?)?;
        }
        atom.add_supply(account.staked_amount, account.liquid_amount)?;
    }
    Ok(atom)
}

/// Multiplier for non voting amounts so that, once every option is weighted,
/// they hold [`NON_VOTERS_TARGET`] of the distributed supply.
fn non_voters_multiplier(atom: &Distrib, params: &DistributionParams) -> Result<Decimal, Error> {
    let yes = atom.votes[VoteOption::Yes].checked_mul(params.yes_multiplier)?;
    let no = atom.votes[VoteOption::No]
        .checked_add(atom.votes[VoteOption::NoWithVeto])?
        .checked_mul(params.no_multiplier)?;
    let non_voters = sum([
        atom.votes[VoteOption::Abstain],
        atom.votes[VoteOption::Empty],
        atom.unstaked,
    ])?;

    if non_voters.is_zero() {
        // nothing is multiplied by it
        log::warn!("no abstained, unvoted or liquid amount, non voters multiplier set to zero");
        return Ok(Decimal::ZERO);
    }
    let multiplier = NON_VOTERS_TARGET
        .checked_mul(yes.checked_add(no)?)?
        .checked_div(VOTERS_TARGET.checked_mul(non_voters)?)?;
    Ok(multiplier)
}

/// Computes the amount of the new token each account receives.
pub fn distribute(accounts: &[Account], params: &DistributionParams) -> Result<Airdrop, Error> {
    params.validate()?;

    let weights = accounts
        .iter()
        .map(vote_weights)
        .collect::<Result<Vec<_>, _>>()?;
    let atom = snapshot_distribution(accounts, &weights)?;
    let multiplier = non_voters_multiplier(&atom, params)?;
    log::info!("non voters multiplier: {}", multiplier);

    let mut addresses = BTreeMap::new();
    let mut atone = Distrib::default();
    let mut icf_slash = Decimal::ZERO;

    for (account, weights) in accounts.iter().zip(&weights) {
        if params.is_excluded(&account.address) {
            icf_slash = sum([icf_slash, account.staked_amount, account.liquid_amount])?;
            continue;
        }

        let staked = account.staked_amount;
        let factor = params.supply_factor;
        let mut awards = VoteMap::new();
        awards.add(
            VoteOption::Yes,
            product([weights[VoteOption::Yes], staked, params.yes_multiplier, factor])?,
        )?;
        awards.add(
            VoteOption::No,
            product([weights[VoteOption::No], staked, params.no_multiplier, factor])?,
        )?;
        awards.add(
            VoteOption::NoWithVeto,
            product([
                weights[VoteOption::NoWithVeto],
                staked,
                params.no_multiplier,
                params.bonus,
                factor,
            ])?,
        )?;
        awards.add(
            VoteOption::Abstain,
            product([weights[VoteOption::Abstain], staked, multiplier, factor])?,
        )?;
        awards.add(
            VoteOption::Empty,
            product([
                weights[VoteOption::Empty],
                staked,
                multiplier,
                params.malus,
                factor,
            ])?,
        )?;
        let liquid = product([account.liquid_amount, multiplier, params.malus, factor])?;
        let voted = awards.total()?;

        for (option, award) in awards.iter() {
            atone.votes.add(option, award)?;
        }
        atone.add_supply(voted, liquid)?;

        let award = liquid
            .checked_add(voted)?
            .to_uint_floor()
            .ok_or_else(|| Error::Overflow(account.address.clone()))?;
        if award > 0 {
            addresses.insert(account.address.clone(), award);
        }
    }

    log::info!(
        "{} addresses receive {} out of a snapshot supply of {}",
        addresses.len(),
        atone.supply.floor(),
        atom.supply.floor()
    );

    Ok(Airdrop {
        addresses,
        non_voters_multiplier: multiplier,
        atom,
        atone,
        icf_slash,
    })
}
