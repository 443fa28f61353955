use crate::decimal::{sum, Decimal};
use crate::Error;
use serde::{Deserialize, Serialize, Serializer};
use std::ops::{Index, IndexMut};

/// Governance vote options, numbered as the governance module numbers them.
///
/// `Empty` stands for "did not vote" and is never cast explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VoteOption {
    Empty = 0,
    Yes = 1,
    Abstain = 2,
    No = 3,
    NoWithVeto = 4,
}

impl VoteOption {
    /// All the options, in the order used whenever amounts are accumulated.
    pub const ALL: [VoteOption; 5] = [
        VoteOption::Empty,
        VoteOption::Yes,
        VoteOption::Abstain,
        VoteOption::No,
        VoteOption::NoWithVeto,
    ];

    fn from_code(code: u64) -> Option<Self> {
        Self::ALL.get(usize::try_from(code).ok()?).copied()
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "VOTE_OPTION_UNSPECIFIED" => Some(Self::Empty),
            "VOTE_OPTION_YES" => Some(Self::Yes),
            "VOTE_OPTION_ABSTAIN" => Some(Self::Abstain),
            "VOTE_OPTION_NO" => Some(Self::No),
            "VOTE_OPTION_NO_WITH_VETO" => Some(Self::NoWithVeto),
            _ => None,
        }
    }
}

impl Serialize for VoteOption {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(*self as u8)
    }
}

mod deser {
    use super::VoteOption;
    use serde::de::{self, Deserialize, Deserializer, Visitor};
    use std::fmt;

    struct VoteOptionVisitor;

    impl<'de> Visitor<'de> for VoteOptionVisitor {
        type Value = VoteOption;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a vote option code (0-4) or a VOTE_OPTION_* name")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            VoteOption::from_code(v).ok_or_else(|| E::custom(format!("unknown vote option {}", v)))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            u64::try_from(v)
                .map_err(|_| E::custom(format!("unknown vote option {}", v)))
                .and_then(|v| self.visit_u64(v))
        }

        // Numbers printed as strings are accepted as well as the protobuf names
        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            match v.parse::<u64>() {
                Ok(code) => self.visit_u64(code),
                Err(_) => VoteOption::from_name(v)
                    .ok_or_else(|| E::custom(format!("unknown vote option {}", v))),
            }
        }
    }

    impl<'de> Deserialize<'de> for VoteOption {
        fn deserialize<D>(deserializer: D) -> Result<VoteOption, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(VoteOptionVisitor)
        }
    }
}

/// One option of a split vote. The weights of a vote add up to one.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeightedVoteOption {
    pub option: VoteOption,
    pub weight: Decimal,
}

/// A cast vote. An empty list means the address did not vote.
pub type WeightedVoteOptions = Vec<WeightedVoteOption>;

/// Decimal amounts for each of the five vote options.
///
/// All options are always present, which is why this is backed by an array
/// rather than a map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoteMap([Decimal; 5]);

impl VoteMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, option: VoteOption, amount: Decimal) -> Result<(), Error> {
        self[option] = self[option].checked_add(amount)?;
        Ok(())
    }

    pub fn get(&self, option: VoteOption) -> Decimal {
        self[option]
    }

    pub fn total(&self) -> Result<Decimal, Error> {
        sum(self.iter().map(|(_, amount)| amount))
    }

    /// Share of `total` held by each option, `None` if `total` is zero.
    pub fn percentages_of(&self, total: Decimal) -> Option<VoteMap> {
        let mut percentages = VoteMap::new();
        for option in VoteOption::ALL {
            percentages[option] = self[option].checked_div(total).ok()?;
        }
        Some(percentages)
    }

    /// Share of the total held by each option, `None` if the map is all zeros.
    pub fn to_percentages(&self) -> Option<VoteMap> {
        self.percentages_of(self.total().ok()?)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VoteOption, Decimal)> + '_ {
        VoteOption::ALL.iter().map(move |option| (*option, self[*option]))
    }
}

impl Index<VoteOption> for VoteMap {
    type Output = Decimal;

    fn index(&self, option: VoteOption) -> &Decimal {
        &self.0[option as usize]
    }
}

impl IndexMut<VoteOption> for VoteMap {
    fn index_mut(&mut self, option: VoteOption) -> &mut Decimal {
        &mut self.0[option as usize]
    }
}

impl Serialize for VoteMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(VoteOption::ALL.len()))?;
        for (option, amount) in self.iter() {
            map.serialize_entry(&option, &amount)?;
        }
        map.end()
    }
}

#[cfg(any(test, feature = "proptest"))]
mod arbitrary {
    use super::*;
    use proptest::prelude::*;

    impl Arbitrary for VoteOption {
        type Parameters = ();
        type Strategy = BoxedStrategy<VoteOption>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            proptest::sample::select(VoteOption::ALL.to_vec()).boxed()
        }
    }
}
