use std::collections::HashMap;

use pulse_core::Post;
use ticker_catalog::{Blacklist, TickerCatalog};

/// Count ticker mentions across a batch of posts.
///
/// Both title and body are tokenized on whitespace. A token is a mention iff
/// it exactly (case-sensitively) matches a catalog symbol and is not
/// blacklisted; every occurrence counts, including repeats within one post.
/// Symbols never mentioned are absent from the result.
pub fn count_mentions(
    posts: &[Post],
    catalog: &TickerCatalog,
    blacklist: &Blacklist,
) -> HashMap<String, u64> {
    let mut counts: HashMap<String, u64> = HashMap::new();

    for post in posts {
        tally_text(&post.title, catalog, blacklist, &mut counts);
        tally_text(&post.body, catalog, blacklist, &mut counts);
    }

    tracing::debug!(
        "Counted mentions for {} distinct tickers across {} posts",
        counts.len(),
        posts.len()
    );
    counts
}

fn tally_text(
    text: &str,
    catalog: &TickerCatalog,
    blacklist: &Blacklist,
    counts: &mut HashMap<String, u64>,
) {
    for token in text.split_whitespace() {
        if blacklist.contains(token) {
            continue;
        }
        if catalog.contains(token) {
            *counts.entry(token.to_string()).or_insert(0) += 1;
        }
    }
}
