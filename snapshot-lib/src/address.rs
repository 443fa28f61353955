use crate::Error;
use bech32::Variant;

const OPERATOR_SUFFIX: &str = "valoper";

fn decode(address: &str) -> Result<(String, Vec<bech32::u5>, Variant), Error> {
    bech32::decode(address).map_err(|source| Error::InvalidAddress {
        address: address.to_string(),
        source,
    })
}

/// Checks that `address` is a well formed bech32 string.
pub fn validate(address: &str) -> Result<(), Error> {
    decode(address).map(|_| ())
}

/// Account address controlled by a validator operator, e.g.
/// `cosmosvaloper1...` becomes `cosmos1...` with the same payload.
pub fn operator_to_account(operator_address: &str) -> Result<String, Error> {
    let (hrp, data, variant) = decode(operator_address)?;
    let account_hrp = hrp
        .strip_suffix(OPERATOR_SUFFIX)
        .ok_or_else(|| Error::NotAnOperatorAddress(operator_address.to_string()))?;
    bech32::encode(account_hrp, data, variant).map_err(|source| Error::InvalidAddress {
        address: operator_address.to_string(),
        source,
    })
}
