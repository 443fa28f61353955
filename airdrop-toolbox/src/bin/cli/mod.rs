mod accounts;
mod distribution;

use color_eyre::Report;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub enum Cli {
    /// Resolve balances, stake and votes of every account from a chain state export
    Accounts(accounts::Accounts),
    /// Compute the airdrop from a list of resolved accounts
    Distribution(distribution::Distribution),
}

impl Cli {
    pub fn exec(self) -> Result<(), Report> {
        match self {
            Self::Accounts(cmd) => cmd.exec(),
            Self::Distribution(cmd) => cmd.exec(),
        }
    }
}
