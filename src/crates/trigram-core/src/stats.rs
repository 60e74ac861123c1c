//! Summary statistics over a frequency table

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::frequency::{Distribution, FrequencyTable, KEY_SEPARATOR};

/// The bigram with the widest choice of next tokens
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusiestBigram {
    pub key: String,
    pub options: usize,
    pub distribution: Distribution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStats {
    /// Distinct normalized tokens seen in keys or as followers
    pub unique_tokens: usize,
    pub possible_bigrams: usize,
    pub bigrams_with_followers: usize,
    pub bigrams_with_multiple_options: usize,
    pub average_options: f64,
    /// Number of distinct followers -> number of bigrams with that many
    pub options_histogram: BTreeMap<usize, usize>,
    pub busiest: Option<BusiestBigram>,
}

impl TableStats {
    pub fn of(table: &FrequencyTable) -> Self {
        let mut tokens: BTreeSet<&str> = BTreeSet::new();
        let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
        let mut busiest: Option<(&String, &Distribution)> = None;

        for (key, followers) in table {
            tokens.extend(key.split(KEY_SEPARATOR));
            tokens.extend(followers.keys().map(String::as_str));
            *histogram.entry(followers.len()).or_insert(0) += 1;
            // strict comparison keeps the first key on ties
            if busiest.map_or(true, |(_, best)| followers.len() > best.len()) {
                busiest = Some((key, followers));
            }
        }

        let bigrams = table.len();
        let total_options: usize = histogram.iter().map(|(options, count)| options * count).sum();
        let average_options = if bigrams == 0 {
            0.0
        } else {
            total_options as f64 / bigrams as f64
        };

        TableStats {
            unique_tokens: tokens.len(),
            possible_bigrams: tokens.len() * tokens.len(),
            bigrams_with_followers: bigrams,
            bigrams_with_multiple_options: table.iter().filter(|(_, d)| d.len() > 1).count(),
            average_options,
            options_histogram: histogram,
            busiest: busiest.map(|(key, distribution)| BusiestBigram {
                key: key.clone(),
                options: distribution.len(),
                distribution: distribution.clone(),
            }),
        }
    }
}
