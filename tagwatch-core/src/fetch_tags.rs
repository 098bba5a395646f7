//! Batch Tag Orchestrator: fetches the tags of every subscribed repository once per cycle.
//!
//! # Flow
//! 1. Shuffle the repository groups so that, over many cycles, the fetch quota lands on every
//!    repository rather than always the first ones in input order.
//! 2. The first `quota` groups are fetched live, one at a time, through the [`RetryPolicy`].
//! 3. The rest are answered from the [`TagCache`] in one batched lookup.
//! 4. Failures degrade that repository to an empty tag list and are reported once, in
//!    aggregate, through [`FetchErrors`].
//!
//! The output lists live-fetched groups first (in shuffled order), then cache-served ones.
//! Input order is not preserved.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::atom::{tags_feed_url, TagEntry};
use crate::config::BatchConfig;
use crate::contract::{FeedSource, TagCache};
use crate::error_report::FetchErrors;
use crate::retry::{AttemptCounter, RetryPolicy};

/// Subscriber identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// One repository and the users subscribed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoGroup {
    /// `"owner/name"`.
    pub repo: String,
    #[serde(default)]
    pub users: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoGroupWithTags {
    pub repo: String,
    pub users: Vec<UserId>,
    pub tags: Vec<TagEntry>,
}

impl RepoGroupWithTags {
    fn new(group: RepoGroup, tags: Vec<TagEntry>) -> Self {
        Self {
            repo: group.repo,
            users: group.users,
            tags,
        }
    }
}

pub struct TagFetcher<'a, S: ?Sized, C: ?Sized> {
    pub source: &'a S,
    pub cache: &'a C,
    pub policy: RetryPolicy,
    pub batch: BatchConfig,
    pub counter: &'a AttemptCounter,
}

impl<'a, S, C> TagFetcher<'a, S, C>
where
    S: FeedSource + ?Sized,
    C: TagCache + ?Sized,
{
    pub async fn fetch_all(&self, groups: Vec<RepoGroup>) -> Vec<RepoGroupWithTags> {
        let mut groups = groups;
        groups.shuffle(&mut rand::rng());
        self.fetch_shuffled(groups).await
    }

    /// Like [`Self::fetch_all`] with a caller-supplied RNG.
    pub async fn fetch_all_with_rng<R>(
        &self,
        groups: Vec<RepoGroup>,
        rng: &mut R,
    ) -> Vec<RepoGroupWithTags>
    where
        R: Rng + ?Sized,
    {
        let mut groups = groups;
        groups.shuffle(rng);
        self.fetch_shuffled(groups).await
    }

    async fn fetch_shuffled(&self, mut live: Vec<RepoGroup>) -> Vec<RepoGroupWithTags> {
        let quota = self.batch.max_tags_to_fetch;
        let from_cache = if live.len() > quota {
            live.split_off(quota)
        } else {
            Vec::new()
        };
        info!(
            live = live.len(),
            from_cache = from_cache.len(),
            "Fetching tags"
        );

        let mut errors = FetchErrors::new();
        let mut result = Vec::with_capacity(live.len() + from_cache.len());

        for group in live {
            let url = tags_feed_url(&self.batch.feed_base_url, &group.repo);
            let tags = match self
                .policy
                .fetch_tags(self.source, &url, self.batch.include_raw_entry, self.counter)
                .await
            {
                Ok(tags) => {
                    debug!(repo = %group.repo, count = tags.len(), "Fetched tags");
                    tags
                }
                Err(e) => {
                    errors.push(&group.repo, e);
                    Vec::new()
                }
            };
            result.push(RepoGroupWithTags::new(group, tags));
        }

        if !from_cache.is_empty() {
            let cached = match self.cache.lookup(&from_cache).await {
                Ok(cached) => cached,
                Err(e) => {
                    error!(error = %e, count = from_cache.len(), "Tag cache lookup failed");
                    Default::default()
                }
            };
            for group in from_cache {
                let tags = cached
                    .get(&group.repo)
                    .map(|name| vec![TagEntry::named(name.clone())])
                    .unwrap_or_default();
                result.push(RepoGroupWithTags::new(group, tags));
            }
        }

        errors.log("fetchTagsErrors");
        result
    }
}
