//! Universe configuration: named groups of exchange tickers.
//!
//! Stored as TOML (`[groups] name = ["SYM", ...]`). Symbols are bare
//! tickers; providers decide how to qualify them for their source.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::DataError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub groups: BTreeMap<String, Vec<String>>,
}

const NIFTY_50: [&str; 50] = [
    "ADANIENT", "ADANIPORTS", "APOLLOHOSP", "ASIANPAINT", "AXISBANK", "BAJAJ-AUTO", "BAJFINANCE",
    "BAJAJFINSV", "BEL", "BHARTIARTL", "CIPLA", "COALINDIA", "DRREDDY", "EICHERMOT", "ETERNAL",
    "GRASIM", "HCLTECH", "HDFCBANK", "HDFCLIFE", "HINDALCO", "HINDUNILVR", "ICICIBANK", "INDIGO",
    "INFY", "ITC", "JIOFIN", "JSWSTEEL", "KOTAKBANK", "LT", "M&M", "MARUTI", "MAXHEALTH",
    "NESTLEIND", "NTPC", "ONGC", "POWERGRID", "RELIANCE", "SBILIFE", "SHRIRAMFIN", "SBIN",
    "SUNPHARMA", "TCS", "TATACONSUM", "TMPV", "TATASTEEL", "TECHM", "TITAN", "TRENT",
    "ULTRACEMCO", "WIPRO",
];

const ETFS: [&str; 3] = ["NIFTYBEES", "JUNIORBEES", "ICICIBANK"];

impl Universe {
    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let content = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a universe from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, DataError> {
        toml::from_str(content).map_err(|e| DataError::Parse {
            context: "universe TOML".into(),
            message: e.to_string(),
        })
    }

    /// Serialize the universe to TOML.
    pub fn to_toml(&self) -> Result<String, DataError> {
        toml::to_string_pretty(self).map_err(|e| DataError::Other(format!("serialize universe: {e}")))
    }

    /// Every symbol across all groups, first occurrence kept, group order.
    pub fn all_symbols(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.groups
            .values()
            .flatten()
            .map(String::as_str)
            .filter(|s| seen.insert(*s))
            .collect()
    }

    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(|v| v.as_slice())
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    /// Restrict to the named groups; unknown names are ignored.
    pub fn select(&self, names: &[String]) -> Self {
        Self {
            groups: self
                .groups
                .iter()
                .filter(|(k, _)| names.contains(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// NIFTY 50 constituents and the supported ETF list.
    pub fn default_nse() -> Self {
        let to_vec = |s: &[&str]| s.iter().map(|t| t.to_string()).collect::<Vec<_>>();
        let mut groups = BTreeMap::new();
        groups.insert("nifty50".to_string(), to_vec(&NIFTY_50));
        groups.insert("etfs".to_string(), to_vec(&ETFS));
        Self { groups }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_universe_has_groups() {
        let u = Universe::default_nse();
        assert_eq!(u.group_names(), vec!["etfs", "nifty50"]);
        assert_eq!(u.group("nifty50").unwrap().len(), 50);
    }

    #[test]
    fn all_symbols_dedups_across_groups() {
        let u = Universe::default_nse();
        let all = u.all_symbols();
        // ICICIBANK is in both groups.
        assert_eq!(all.len(), 52);
        assert_eq!(all.iter().filter(|s| **s == "ICICIBANK").count(), 1);
    }

    #[test]
    fn toml_roundtrip() {
        let u = Universe::default_nse();
        let text = u.to_toml().unwrap();
        assert_eq!(Universe::from_toml(&text).unwrap(), u);
    }

    #[test]
    fn select_keeps_named_groups() {
        let u = Universe::default_nse().select(&["etfs".to_string(), "nope".to_string()]);
        assert_eq!(u.group_names(), vec!["etfs"]);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(
            Universe::from_toml("groups = 3"),
            Err(DataError::Parse { .. })
        ));
    }
}
