use std::fs::write;
use tagwatch::sources::{JsonFileTagCache, StaticTokenSource};
use tagwatch_core::contract::{TagCache, TokenSource};
use tagwatch_core::fetch_tags::RepoGroup;
use tempfile::TempDir;

fn groups(repos: &[&str]) -> Vec<RepoGroup> {
    repos
        .iter()
        .map(|repo| RepoGroup {
            repo: repo.to_string(),
            users: vec![],
        })
        .collect()
}

#[tokio::test]
async fn test_cache_returns_only_requested_repos() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.json");
    write(&path, r#"{ "o/a": "v1", "o/b": "v2", "o/c": "v3" }"#).unwrap();

    let cache = JsonFileTagCache::new(&path);
    let found = cache.lookup(&groups(&["o/a", "o/c", "o/missing"])).await.unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(found["o/a"], "v1");
    assert_eq!(found["o/c"], "v3");
    assert!(!found.contains_key("o/missing"));
}

#[tokio::test]
async fn test_missing_cache_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let cache = JsonFileTagCache::new(dir.path().join("nothing-here.json"));
    let found = cache.lookup(&groups(&["o/a"])).await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_malformed_cache_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.json");
    write(&path, "[not, an, object").unwrap();

    let cache = JsonFileTagCache::new(&path);
    assert!(cache.lookup(&groups(&["o/a"])).await.is_err());
}

#[tokio::test]
async fn test_static_tokens() {
    let source = StaticTokenSource::new(vec!["t0".into(), "t1".into()]);
    assert_eq!(source.load_access_tokens().await.unwrap(), vec!["t0", "t1"]);
    assert!(StaticTokenSource::default()
        .load_access_tokens()
        .await
        .unwrap()
        .is_empty());
}
