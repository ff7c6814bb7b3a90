//! Frequency ranking of free-form mood and symptom tags.
//!
//! Ties are broken by byte-wise lexical order of the tag, so rankings never depend on
//! the order the logs were supplied in.

use std::collections::BTreeMap;

/// Every distinct tag with its count, most frequent first.
pub fn rank<'a, I>(tags: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tag in tags {
        *counts.entry(tag.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(tag, count)| (tag.to_owned(), count))
        .collect();
    // stable: equal counts keep the BTreeMap's lexical order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

pub fn top<'a, I>(tags: I, n: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    rank(tags).into_iter().take(n).map(|(tag, _)| tag).collect()
}

pub fn dominant<'a, I>(tags: I) -> Option<String>
where
    I: IntoIterator<Item = &'a String>,
{
    top(tags, 1).into_iter().next()
}
