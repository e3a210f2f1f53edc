use super::summary::ChartSeries;
use std::collections::{BTreeMap, HashMap};

/// Occurrence counts that remember the order keys were first seen, so ties
/// in top-N selection resolve by encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.order.push(key.to_string());
                self.counts.insert(key.to_string(), 1);
            }
        }
    }

    pub fn get(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Keys with counts, in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.order.iter().map(move |k| (k.as_str(), self.get(k)))
    }

    pub fn to_map(&self) -> BTreeMap<String, usize> {
        self.iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    /// All keys sorted alphabetically with aligned counts.
    pub fn sorted_by_label(&self) -> ChartSeries {
        let (labels, data) = self.to_map().into_iter().unzip();
        ChartSeries { labels, data }
    }

    /// The `n` most frequent keys, highest first; equal counts keep
    /// encounter order.
    pub fn top_n(&self, n: usize) -> ChartSeries {
        let mut entries: Vec<(&str, usize)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        let (labels, data) = entries
            .into_iter()
            .take(n)
            .map(|(k, v)| (k.to_string(), v))
            .unzip();
        ChartSeries { labels, data }
    }
}
