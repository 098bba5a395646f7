//! Feed Parser: pulls tag names out of an Atom feed by pattern matching.
//!
//! Only the `<entry>` fragments and their `<id>` element are looked at. A fragment whose id
//! does not match is skipped; one bad entry never fails the whole feed.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A tag or release found in a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    pub name: String,
    /// The original `<entry>` fragment, or empty when it was not requested.
    pub raw_entry: String,
}

impl TagEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_entry: String::new(),
        }
    }
}

fn entry_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<entry>.*?</entry>").expect("static entry pattern"))
}

// `tag:github.com,2008:Repository/123/release/1.0` keeps the slash in the tag name.
fn repository_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<id>[^<]+Repository/\d+/([^<]+)</id>").expect("static id pattern")
    })
}

fn path_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<id>[^<]+/([^/<]+)</id>").expect("static id pattern"))
}

/// Parse an Atom document into its tag entries, in document order.
pub fn parse(xml: &str, include_raw_entry: bool) -> Vec<TagEntry> {
    entry_regex()
        .find_iter(xml)
        .filter_map(|m| {
            let entry = m.as_str();
            let name = repository_id_regex()
                .captures(entry)
                .or_else(|| path_id_regex().captures(entry))
                .and_then(|c| c.get(1))?
                .as_str()
                .to_string();
            Some(TagEntry {
                name,
                raw_entry: if include_raw_entry {
                    entry.to_string()
                } else {
                    String::new()
                },
            })
        })
        .collect()
}

/// URL of the tags feed for an `"owner/name"` repository.
pub fn tags_feed_url(base_url: &str, repo: &str) -> String {
    format!("{}/{}/tags.atom", base_url.trim_end_matches('/'), repo)
}
