use tagwatch_core::atom::{parse, tags_feed_url, TagEntry};

fn entry(id: &str) -> String {
    format!(
        "<entry>\n    <id>{id}</id>\n    <updated>2024-05-01T10:00:00Z</updated>\n    <title>t</title>\n  </entry>"
    )
}

fn feed(entries: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<feed xmlns=\"http://www.w3.org/2005/Atom\">\n  <id>tag:github.com,2008:https://github.com/owner/repo/releases</id>\n  {}\n</feed>",
        entries.join("\n  ")
    )
}

#[test]
fn test_parse_table_driven() {
    struct TestCase {
        name: &'static str,
        xml: String,
        expected: Vec<&'static str>,
    }

    let test_cases = vec![
        TestCase {
            name: "no entries",
            xml: feed(&[]),
            expected: vec![],
        },
        TestCase {
            name: "repository ids in document order",
            xml: feed(&[
                entry("tag:github.com,2008:Repository/123/v2.0.0"),
                entry("tag:github.com,2008:Repository/123/v1.9.1"),
                entry("tag:github.com,2008:Repository/123/v1.9.0"),
            ]),
            expected: vec!["v2.0.0", "v1.9.1", "v1.9.0"],
        },
        TestCase {
            name: "entries without a matching id are dropped",
            xml: feed(&[
                entry("tag:github.com,2008:Repository/9/v1"),
                "<entry><title>no id here</title></entry>".to_string(),
                entry("no-slash-at-all"),
                entry("tag:github.com,2008:Repository/9/v2"),
            ]),
            expected: vec!["v1", "v2"],
        },
        TestCase {
            name: "repository prefix keeps slashes in the tag name",
            xml: feed(&[entry("tag:github.com,2008:Repository/42/release/1.0")]),
            expected: vec!["release/1.0"],
        },
        TestCase {
            name: "path-shaped id without repository prefix",
            xml: feed(&[entry("https://example.com/owner/repo/releases/tag/v3")]),
            expected: vec!["v3"],
        },
        TestCase {
            name: "not xml at all",
            xml: "<html>rate limited</html>".to_string(),
            expected: vec![],
        },
    ];

    for tc in test_cases {
        let names: Vec<String> = parse(&tc.xml, false).into_iter().map(|e| e.name).collect();
        assert_eq!(names, tc.expected, "{}", tc.name);
    }
}

#[test]
fn test_parse_keeps_raw_entry_only_when_requested() {
    let first = entry("tag:github.com,2008:Repository/1/v1.0");
    let xml = feed(&[first.clone()]);

    let with_raw = parse(&xml, true);
    assert_eq!(
        with_raw,
        vec![TagEntry {
            name: "v1.0".into(),
            raw_entry: first,
        }]
    );

    let without_raw = parse(&xml, false);
    assert_eq!(without_raw, vec![TagEntry::named("v1.0")]);
}

#[test]
fn test_tags_feed_url() {
    assert_eq!(
        tags_feed_url("https://github.com", "rust-lang/rust"),
        "https://github.com/rust-lang/rust/tags.atom"
    );
    assert_eq!(
        tags_feed_url("http://127.0.0.1:8080/", "a/b"),
        "http://127.0.0.1:8080/a/b/tags.atom"
    );
}
