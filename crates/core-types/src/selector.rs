//! Selector candidate chains

use serde::{Deserialize, Serialize};
use std::fmt;

/// One locator alternative: an ordered pierce chain.
///
/// Every entry after the first is queried relative to the element matched by
/// the previous entry, which lets a chain cross shadow roots or iframes one hop
/// at a time. Recorders emit either a bare string (single hop) or an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawChain", into = "Vec<String>")]
pub struct SelectorChain(Vec<String>);

impl SelectorChain {
    pub fn new<I, S>(hops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(hops.into_iter().map(Into::into).collect())
    }

    /// Hops in resolution order
    pub fn hops(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for SelectorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" >> "))
    }
}

impl From<&str> for SelectorChain {
    fn from(selector: &str) -> Self {
        Self(vec![selector.to_string()])
    }
}

impl From<Vec<String>> for SelectorChain {
    fn from(hops: Vec<String>) -> Self {
        Self(hops)
    }
}

impl From<SelectorChain> for Vec<String> {
    fn from(chain: SelectorChain) -> Self {
        chain.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawChain {
    Single(String),
    Pierce(Vec<String>),
}

impl From<RawChain> for SelectorChain {
    fn from(raw: RawChain) -> Self {
        match raw {
            RawChain::Single(selector) => Self(vec![selector]),
            RawChain::Pierce(hops) => Self(hops),
        }
    }
}

/// Render alternatives for diagnostics: `a >> b; c`
pub fn describe_selectors(selectors: &[SelectorChain]) -> String {
    selectors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
