use airdrop_toolbox::utils::{read_json, write_json};
use color_eyre::Report;
use snapshot_lib::raw::{
    account_types_by_address, balances_by_address, delegations_by_address, validators_by_address,
    votes_by_address, RawAccount, RawBalance, RawDelegation, RawValidator, RawVote,
};
use std::path::PathBuf;
use structopt::StructOpt;

pub const ACCOUNTS_FILE: &str = "accounts.json";

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Accounts {
    /// Directory holding delegations.json, votes.json, validators.json,
    /// balances.json and auth_accounts.json. accounts.json is written there.
    datapath: PathBuf,

    /// Denomination of the liquid balances
    #[structopt(long, default_value = "uatom")]
    denom: String,
}

impl Accounts {
    pub fn exec(self) -> Result<(), Report> {
        let Accounts { datapath, denom } = self;

        let votes = votes_by_address(read_json::<Vec<RawVote>>(&datapath.join("votes.json"))?);
        let validators = validators_by_address(
            read_json::<Vec<RawValidator>>(&datapath.join("validators.json"))?,
            &votes,
        )?;
        let delegations = delegations_by_address(read_json::<Vec<RawDelegation>>(
            &datapath.join("delegations.json"),
        )?);
        let balances = balances_by_address(
            read_json::<Vec<RawBalance>>(&datapath.join("balances.json"))?,
            &denom,
        )?;
        let account_types = account_types_by_address(read_json::<Vec<RawAccount>>(
            &datapath.join("auth_accounts.json"),
        )?)?;
        log::info!(
            "{} votes, {} active validators, {} delegators, {} balances",
            votes.len(),
            validators.len(),
            delegations.len(),
            balances.len()
        );

        let accounts = snapshot_lib::resolve(
            &delegations,
            &votes,
            &validators,
            &balances,
            &account_types,
        )?;

        let accounts_file = datapath.join(ACCOUNTS_FILE);
        write_json(&accounts_file, &accounts)?;
        log::info!("{} accounts written to {}", accounts.len(), accounts_file.display());
        Ok(())
    }
}
