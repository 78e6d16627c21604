//! Tier labels.
//!
//! `Tier` is a closed enumeration. Its derived `Ord` follows rank, best first:
//! `Tier::Sss < Tier::SPlus < ... < Tier::D`, so sorting a set of tiers
//! ascending yields them in presentation order.

use core::fmt;
use core::str::FromStr;

use crate::errors::CoreError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Tier {
    #[cfg_attr(feature = "serde", serde(rename = "SSS"))]
    Sss,
    #[cfg_attr(feature = "serde", serde(rename = "S+"))]
    SPlus,
    S,
    A,
    B,
    C,
    D,
}

impl Tier {
    /// All tiers, best first.
    pub const ALL: [Tier; 7] = [Tier::Sss, Tier::SPlus, Tier::S, Tier::A, Tier::B, Tier::C, Tier::D];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Sss => "SSS",
            Tier::SPlus => "S+",
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
            Tier::D => "D",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = CoreError;

    /// Case-insensitive; accepts `S+` and the spelled-out `SPLUS`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SSS" => Ok(Tier::Sss),
            "S+" | "SPLUS" => Ok(Tier::SPlus),
            "S" => Ok(Tier::S),
            "A" => Ok(Tier::A),
            "B" => Ok(Tier::B),
            "C" => Ok(Tier::C),
            "D" => Ok(Tier::D),
            _ => Err(CoreError::UnknownTier(s.to_string())),
        }
    }
}
