//! Concrete token and tag-cache collaborators for the CLI.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tagwatch_core::contract::{BoxError, TagCache, TokenSource};
use tagwatch_core::fetch_tags::RepoGroup;

/// Tokens known up front, from the config file or `TAGWATCH_ACCESS_TOKENS`.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenSource {
    tokens: Vec<String>,
}

impl StaticTokenSource {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn load_access_tokens(&self) -> Result<Vec<String>, BoxError> {
        Ok(self.tokens.clone())
    }
}

/// Tag cache backed by a JSON object on disk: `{ "owner/name": "tag" }`.
///
/// The file is re-read on every lookup so an external job can refresh it between cycles.
#[derive(Debug, Clone)]
pub struct JsonFileTagCache {
    path: PathBuf,
}

impl JsonFileTagCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TagCache for JsonFileTagCache {
    async fn lookup(&self, groups: &[RepoGroup]) -> Result<HashMap<String, String>, BoxError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(cache_path = ?self.path, "Tag cache file missing, treating as empty");
                return Ok(HashMap::new());
            }
            Err(e) => {
                tracing::error!(error = ?e, cache_path = ?self.path, "Failed to read tag cache");
                return Err(Box::new(e));
            }
        };

        let mut all: HashMap<String, String> = serde_json::from_str(&content)?;
        let found: HashMap<String, String> = groups
            .iter()
            .filter_map(|group| all.remove_entry(&group.repo))
            .collect();
        tracing::info!(
            requested = groups.len(),
            found = found.len(),
            "Tag cache lookup complete"
        );
        Ok(found)
    }
}
