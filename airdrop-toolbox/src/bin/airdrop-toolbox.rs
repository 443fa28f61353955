mod cli;

use color_eyre::Report;
use structopt::StructOpt;

fn main() -> Result<(), Report> {
    color_eyre::install()?;
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();
    cli::Cli::from_args().exec()
}
