use super::accounts::ACCOUNTS_FILE;
use airdrop_toolbox::distribution::{distribute, Distrib, DistributionParams};
use airdrop_toolbox::utils::{read_json, write_json};
use color_eyre::Report;
use snapshot_lib::{Account, Decimal, VoteOption};
use std::io::Write;
use std::path::PathBuf;
use structopt::StructOpt;

pub const AIRDROP_FILE: &str = "airdrop.json";

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Distribution {
    /// Directory holding accounts.json. airdrop.json is written there.
    datapath: PathBuf,

    /// Path to a json encoded `DistributionParams`, missing fields take their
    /// default value
    #[structopt(long)]
    params: Option<PathBuf>,
}

impl Distribution {
    pub fn exec(self) -> Result<(), Report> {
        let Distribution { datapath, params } = self;

        let params = match params {
            Some(path) => read_json::<DistributionParams>(&path)?,
            None => DistributionParams::default(),
        };
        let accounts = read_json::<Vec<Account>>(&datapath.join(ACCOUNTS_FILE))?;

        let airdrop = distribute(&accounts, &params)?;
        log::info!("ICF slash: {}", airdrop.icf_slash.floor());

        let airdrop_file = datapath.join(AIRDROP_FILE);
        write_json(&airdrop_file, &airdrop.addresses)?;
        log::info!(
            "{} awards written to {}",
            airdrop.addresses.len(),
            airdrop_file.display()
        );

        write_summary(std::io::stdout(), &airdrop.atom, &airdrop.atone)
    }
}

const SUMMARY_COLUMNS: [VoteOption; 5] = [
    VoteOption::Empty,
    VoteOption::Yes,
    VoteOption::No,
    VoteOption::NoWithVeto,
    VoteOption::Abstain,
];

fn amounts(distrib: &Distrib) -> Vec<Decimal> {
    std::iter::once(distrib.supply)
        .chain(SUMMARY_COLUMNS.iter().map(|option| distrib.votes[*option]))
        .chain(std::iter::once(distrib.unstaked))
        .collect()
}

fn millions(distrib: &Distrib) -> Result<Vec<String>, Report> {
    let million = Decimal::from_integer(1_000_000);
    amounts(distrib)
        .into_iter()
        .map(|amount| Ok(format!("{:.0}M", amount.checked_div(million)?)))
        .collect()
}

fn percentages(distrib: &Distrib) -> Vec<String> {
    let hundred = Decimal::from_integer(100);
    let by_option = distrib.percentages();
    std::iter::once(distrib.percentage(distrib.supply))
        .chain(
            SUMMARY_COLUMNS
                .iter()
                .map(|option| by_option.as_ref().map(|shares| shares[*option])),
        )
        .chain(std::iter::once(distrib.percentage(distrib.unstaked)))
        .map(|share| match share.and_then(|share| share.checked_mul(hundred).ok()) {
            Some(share) => format!("{:.2}%", share),
            None => "-".to_string(),
        })
        .collect()
}

fn write_summary(writer: impl Write, atom: &Distrib, atone: &Distrib) -> Result<(), Report> {
    let header = [
        "",
        "TOTAL",
        "DID NOT VOTE",
        "YES",
        "NO",
        "NOWITHVETO",
        "ABSTAIN",
        "NOT STAKED",
    ];
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&header)?;

    let rows = [
        ("$ATOM", millions(atom)?),
        ("$ATONE", millions(atone)?),
        ("% ATONE", percentages(atone)),
    ];
    for (label, cells) in rows {
        let record = std::iter::once(label.to_string()).chain(cells);
        csv_writer.write_record(record)?;
    }
    csv_writer.flush()?;

    Ok(())
}
