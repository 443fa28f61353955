pub mod account;
pub mod address;
pub mod decimal;
pub mod raw;
mod resolver;
mod utils;
pub mod vote;

pub use account::{Account, AccountAddress, AccountType, Delegation, ValidatorAddress};
pub use decimal::Decimal;
pub use resolver::resolve;
pub use vote::{VoteMap, VoteOption, WeightedVoteOption, WeightedVoteOptions};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid address {address}")]
    InvalidAddress {
        address: String,
        #[source]
        source: bech32::Error,
    },
    #[error("{0} is not a validator operator address")]
    NotAnOperatorAddress(String),
    #[error("validator {0} has no delegator shares")]
    ZeroDelegatorShares(ValidatorAddress),
    #[error("account of type {0} has no address")]
    MissingAddress(AccountType),
    #[error("invalid decimal {0}")]
    InvalidDecimal(String),
    #[error("decimal arithmetic overflow")]
    Overflow,
    #[error("division by zero")]
    DivisionByZero,
}
