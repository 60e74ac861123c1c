//! Weighted random choice of the next token

use rand::Rng;

use crate::frequency::{Distribution, FrequencyTable};

/// Pick a follower of `key`, weighted by count.
///
/// Returns `None` when the bigram was never observed; the caller decides
/// what a missing continuation means.
pub fn select<'t, R: Rng + ?Sized>(table: &'t FrequencyTable, key: &str, rng: &mut R) -> Option<&'t str> {
    table.followers(key).and_then(|d| select_from(d, rng))
}

/// Categorical draw over a distribution.
///
/// Draws an integer in `[1, total]` and walks the entries in key order,
/// accumulating counts until the running sum reaches the draw.
pub fn select_from<'d, R: Rng + ?Sized>(distribution: &'d Distribution, rng: &mut R) -> Option<&'d str> {
    let total: u64 = distribution.values().map(|&c| c as u64).sum();
    if total == 0 {
        return None;
    }
    let draw = rng.gen_range(1..=total);
    let mut running = 0u64;
    for (token, &count) in distribution {
        running += count as u64;
        if running >= draw {
            return Some(token.as_str());
        }
    }
    None
}
