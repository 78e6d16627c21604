//! Daily post time for a scope (`HH:MM`, 24 h, in the scope's configured zone).

use core::fmt;
use core::str::FromStr;

use crate::errors::CoreError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct PostTime {
    hour: u8,
    minute: u8,
}

impl PostTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, CoreError> {
        if hour < 24 && minute < 60 {
            Ok(PostTime { hour, minute })
        } else {
            Err(CoreError::InvalidPostTime(format!("{hour}:{minute}")))
        }
    }
}

impl fmt::Display for PostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for PostTime {
    type Err = CoreError;

    /// Accepts `HH:MM`, `H:MM` and the colon-less `HHMM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CoreError::InvalidPostTime(s.to_string());
        let t = s.trim();
        let digits = |x: &str| x.bytes().all(|b| b.is_ascii_digit());
        let (h, m) = match t.split_once(':') {
            Some(parts) => parts,
            None if t.len() == 4 && digits(t) => t.split_at(2),
            None => return Err(bad()),
        };
        if h.is_empty() || h.len() > 2 || m.len() != 2 || !digits(h) || !digits(m) {
            return Err(bad());
        }
        let hour: u8 = h.parse().map_err(|_| bad())?;
        let minute: u8 = m.parse().map_err(|_| bad())?;
        PostTime::new(hour, minute).map_err(|_| bad())
    }
}

impl TryFrom<String> for PostTime {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PostTime> for String {
    fn from(t: PostTime) -> String {
        t.to_string()
    }
}
