//! Tie-aware "most common value" aggregation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Every key tied at the highest count, plus that count
///
/// Leaders are listed in the order they were first seen. No input (or only
/// blank keys) gives no leaders and a count of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSummary {
    pub leaders: Vec<String>,
    pub count: u64,
}

impl ModeSummary {
    pub fn is_empty(&self) -> bool {
        self.leaders.is_empty()
    }
}

/// Count the keys `extractor` yields for each record and return the leaders
///
/// A record may contribute any number of keys; each one counts once.
/// Keys are trimmed and blank keys are ignored.
pub fn mode_by_field<'a, T, F, K>(records: &'a [T], extractor: F) -> ModeSummary
where
    F: Fn(&'a T) -> K,
    K: IntoIterator<Item = &'a str>,
{
    let mut tallies: Vec<(String, u64)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for key in records.iter().flat_map(extractor) {
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        match positions.get(key) {
            Some(&index) => tallies[index].1 += 1,
            None => {
                positions.insert(key.to_string(), tallies.len());
                tallies.push((key.to_string(), 1));
            }
        }
    }

    let count = tallies.iter().map(|(_, n)| *n).max().unwrap_or(0);
    let leaders = tallies
        .into_iter()
        .filter(|(_, n)| count > 0 && *n == count)
        .map(|(key, _)| key)
        .collect();

    ModeSummary { leaders, count }
}
