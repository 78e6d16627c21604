//! tl_core: Core types, tiers, scope configuration, exact ratios and stable ordering.
//!
//! This crate is **I/O-free**. It defines the stable types used across the
//! engine (`tl_algo`, `tl_io`, `tl_pipeline`, `tl_report`, `tl_cli`).
//!
//! - Tokens: `ScopeId`, `VoterId`, `ItemId`
//! - `Tier` (closed, rank-ordered) and `ScopeConfig` (weights, thresholds, caps)
//! - Integer-first ratio helpers for damped averages
//! - `PostTime` for the daily post slot
//! - Deterministic ordering helpers
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod config;
pub mod determinism;
pub mod rounding;
pub mod schedule;
pub mod tier;

pub use config::{ScopeConfig, DEFAULT_DAMPING};
pub use schedule::PostTime;
pub use tier::Tier;
pub use tokens::{ItemId, ScopeId, VoterId};

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidToken,
        InvalidItem,
        UnknownTier(String),
        InvalidPostTime(String),
        DomainOutOfRange(&'static str),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidToken => write!(f, "invalid token"),
                CoreError::InvalidItem => write!(f, "invalid item id"),
                CoreError::UnknownTier(t) => write!(f, "unknown tier: {t}"),
                CoreError::InvalidPostTime(t) => write!(f, "invalid post time (expected HH:MM): {t}"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod tokens {
    //! Identifier newtypes with strict charsets.
    //!
    //! `ScopeId` and `VoterId` are platform snowflakes or slugs and double as
    //! directory names, so they are restricted to `[A-Za-z0-9_.:-]{1,64}`.
    //! `ItemId` is a song title and accepts any printable text up to 200 chars.

    use crate::errors::CoreError;
    use core::fmt;
    use core::str::FromStr;

    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    const MAX_ITEM_CHARS: usize = 200;

    fn is_token(s: &str) -> bool {
        let len = s.len();
        if !(1..=64).contains(&len) || s.bytes().all(|b| b == b'.') {
            return false;
        }
        s.bytes().all(|b| matches!(b,
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' |
            b'_' | b'-' | b':' | b'.'
        ))
    }

    fn is_item(s: &str) -> bool {
        !s.trim().is_empty()
            && s.chars().count() <= MAX_ITEM_CHARS
            && !s.chars().any(char::is_control)
    }

    macro_rules! def_token {
        ($name:ident, $check:ident, $err:expr) => {
            #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
            #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
            #[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
            pub struct $name(String);

            impl $name {
                pub fn as_str(&self) -> &str { &self.0 }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
            }

            impl FromStr for $name {
                type Err = CoreError;
                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    if $check(s) { Ok(Self(s.to_string())) } else { Err($err) }
                }
            }

            impl TryFrom<String> for $name {
                type Error = CoreError;
                fn try_from(s: String) -> Result<Self, Self::Error> {
                    if $check(&s) { Ok(Self(s)) } else { Err($err) }
                }
            }

            impl From<$name> for String {
                fn from(v: $name) -> String { v.0 }
            }

            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str { &self.0 }
            }
        };
    }

    def_token!(ScopeId, is_token, CoreError::InvalidToken);
    def_token!(VoterId, is_token, CoreError::InvalidToken);
    def_token!(ItemId, is_item, CoreError::InvalidItem);

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn scope_tokens_are_strict() {
            assert!("123456789012345678".parse::<ScopeId>().is_ok());
            assert!("guild.main".parse::<ScopeId>().is_ok());
            assert_eq!("".parse::<ScopeId>(), Err(CoreError::InvalidToken));
            assert_eq!("../etc".parse::<ScopeId>(), Err(CoreError::InvalidToken));
            assert_eq!("..".parse::<ScopeId>(), Err(CoreError::InvalidToken));
            assert_eq!("a b".parse::<VoterId>(), Err(CoreError::InvalidToken));
            assert!("x".repeat(65).parse::<VoterId>().is_err());
        }

        #[test]
        fn item_ids_accept_titles() {
            assert!("Tell Your World".parse::<ItemId>().is_ok());
            assert!("セカイはまだ始まってすらいない".parse::<ItemId>().is_ok());
            assert!("Song, with comma".parse::<ItemId>().is_ok());
            assert_eq!("   ".parse::<ItemId>(), Err(CoreError::InvalidItem));
            assert_eq!("line\nbreak".parse::<ItemId>(), Err(CoreError::InvalidItem));
            assert!("y".repeat(201).parse::<ItemId>().is_err());
        }

        #[cfg(feature = "serde")]
        #[test]
        fn serde_rejects_invalid_tokens() {
            let ok: ScopeId = serde_json::from_str("\"42\"").unwrap();
            assert_eq!(ok.as_str(), "42");
            assert!(serde_json::from_str::<ScopeId>("\"no/slash\"").is_err());
        }
    }
}
