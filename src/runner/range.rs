//! Task number selectors
//!
//! A selector is a list of integers and `a..b` intervals separated by commas,
//! spaces or newlines, e.g. `1,5..8,12..`. Either interval bound may be left
//! out to leave that side open.

use crate::error::{ConfigError, ConfigResult};
use regex::Regex;

/// One selector token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeToken {
    Exact(usize),
    Interval {
        lower: Option<usize>,
        upper: Option<usize>,
    },
}

impl RangeToken {
    fn parse(token: &str) -> ConfigResult<Self> {
        use std::sync::LazyLock;
        static INTERVAL_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"^(\d*)\.\.(\d*)$").unwrap());

        let invalid = || ConfigError::InvalidRange(token.to_string());

        if token.bytes().all(|b| b.is_ascii_digit()) {
            return token.parse().map(RangeToken::Exact).map_err(|_| invalid());
        }

        let caps = INTERVAL_RE.captures(token).ok_or_else(invalid)?;
        let bound = |i: usize| -> ConfigResult<Option<usize>> {
            match caps.get(i).map(|m| m.as_str()) {
                None | Some("") => Ok(None),
                Some(digits) => digits.parse().map(Some).map_err(|_| invalid()),
            }
        };

        Ok(RangeToken::Interval {
            lower: bound(1)?,
            upper: bound(2)?,
        })
    }

    pub fn contains(&self, n: usize) -> bool {
        match *self {
            RangeToken::Exact(value) => n == value,
            RangeToken::Interval { lower, upper } => {
                lower.map_or(true, |lo| n >= lo) && upper.map_or(true, |hi| n <= hi)
            }
        }
    }
}

/// A parsed selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSelector {
    tokens: Vec<RangeToken>,
}

impl RangeSelector {
    /// Parse a selector, rejecting the whole thing if any token is malformed
    pub fn parse(selector: &str) -> ConfigResult<Self> {
        let tokens = selector
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(RangeToken::parse)
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(RangeSelector { tokens })
    }

    /// Whether `n` is matched by any token
    pub fn contains(&self, n: usize) -> bool {
        self.tokens.iter().any(|t| t.contains(n))
    }

    pub fn tokens(&self) -> &[RangeToken] {
        &self.tokens
    }
}

/// Check `n` against a selector string
pub fn in_range(n: usize, selector: &str) -> ConfigResult<bool> {
    Ok(RangeSelector::parse(selector)?.contains(n))
}

/// Which tasks a run executes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(RangeSelector),
    Skip(RangeSelector),
}

impl Selection {
    /// Build from the `--only` / `--skip` values; both at once is an error
    pub fn from_flags(only: Option<&str>, skip: Option<&str>) -> ConfigResult<Self> {
        match (only, skip) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingSelectors),
            (Some(only), None) => Ok(Selection::Only(RangeSelector::parse(only)?)),
            (None, Some(skip)) => Ok(Selection::Skip(RangeSelector::parse(skip)?)),
            (None, None) => Ok(Selection::All),
        }
    }

    /// Whether task number `n` is left out of the run
    pub fn skips(&self, n: usize) -> bool {
        match self {
            Selection::All => false,
            Selection::Only(ranges) => !ranges.contains(n),
            Selection::Skip(ranges) => ranges.contains(n),
        }
    }
}
