use std::fmt::Write;

use trigram_core::TableStats;

/// Render one statistics block for `trigrams.txt`
pub fn format_stats(title: &str, stats: &TableStats) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_stats(&mut out, title, stats);
    out
}

fn write_stats(out: &mut String, title: &str, stats: &TableStats) -> std::fmt::Result {
    writeln!(out, "--- {} ---", title)?;
    writeln!(out, "Total unique tokens: {}", stats.unique_tokens)?;
    writeln!(out, "Possible 2-note combinations: {}", stats.possible_bigrams)?;
    writeln!(out, "Actual bigrams with followers: {}", stats.bigrams_with_followers)?;
    writeln!(out, "Bigrams with multiple options: {}", stats.bigrams_with_multiple_options)?;
    writeln!(out, "Average options for third note: {:.2}", stats.average_options)?;
    match &stats.busiest {
        Some(busiest) => {
            writeln!(out, "Bigram with most options ('{}' -> {} options):", busiest.key, busiest.options)?;
            let entries: Vec<String> = busiest
                .distribution
                .iter()
                .map(|(token, count)| format!("{}: {}", token, count))
                .collect();
            writeln!(out, "  [{}]", entries.join(", "))?;
        }
        None => writeln!(out, "Bigram with most options: none")?,
    }
    writeln!(out)
}
