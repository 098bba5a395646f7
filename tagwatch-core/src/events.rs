//! Global activity feed: page validation, merging, and the release/tag filter.
//!
//! Pages arrive as raw JSON. A page is accepted only when it is an array of objects each
//! carrying a numeric id (the upstream sends ids as numeric strings, plain numbers are
//! accepted too). Anything else is treated as an empty page by the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "ReleaseEvent")]
    Release,
    /// A `CreateEvent` whose `ref_type` is `tag`.
    #[serde(rename = "CreateEvent")]
    TagCreate,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalEvent {
    pub id: u64,
    pub kind: EventKind,
    pub repo_name: String,
    pub tag_name: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl GlobalEvent {
    /// Builds an event from one validated feed object.
    ///
    /// Returns `None` only when the id is missing or not numeric.
    pub fn from_json(value: &Value) -> Option<Self> {
        let id = event_id(value)?;
        let payload = value.get("payload");
        let kind = match value.get("type").and_then(Value::as_str) {
            Some("ReleaseEvent") => EventKind::Release,
            Some("CreateEvent")
                if payload
                    .and_then(|p| p.get("ref_type"))
                    .and_then(Value::as_str)
                    == Some("tag") =>
            {
                EventKind::TagCreate
            }
            _ => EventKind::Other,
        };
        let tag_name = match kind {
            EventKind::Release => payload
                .and_then(|p| p.pointer("/release/tag_name"))
                .and_then(Value::as_str),
            EventKind::TagCreate => payload.and_then(|p| p.get("ref")).and_then(Value::as_str),
            EventKind::Other => None,
        }
        .unwrap_or_default()
        .to_string();
        let repo_name = value
            .pointer("/repo/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let created_at = value
            .get("created_at")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc));

        Some(Self {
            id,
            kind,
            repo_name,
            tag_name,
            created_at,
        })
    }

    pub fn is_release(&self) -> bool {
        matches!(self.kind, EventKind::Release | EventKind::TagCreate)
    }
}

/// The message published downstream for each new release or tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseMessage {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub repo_name: String,
    pub tag_name: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&GlobalEvent> for ReleaseMessage {
    fn from(event: &GlobalEvent) -> Self {
        Self {
            id: event.id,
            kind: event.kind,
            repo_name: event.repo_name.clone(),
            tag_name: event.tag_name.clone(),
            created_at: event.created_at,
        }
    }
}

fn event_id(value: &Value) -> Option<u64> {
    match value.get("id")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Accepts a page only if every element is an object with a numeric id.
pub fn validate_page(page: Value) -> Option<Vec<GlobalEvent>> {
    let Value::Array(items) = page else {
        debug!("Events page is not an array");
        return None;
    };
    items
        .iter()
        .map(|item| item.is_object().then(|| GlobalEvent::from_json(item)).flatten())
        .collect()
}

/// Concatenates pages, sorts by id descending and keeps the first event per id.
pub fn merge_pages(pages: Vec<Vec<GlobalEvent>>) -> Vec<GlobalEvent> {
    let mut events: Vec<GlobalEvent> = pages.into_iter().flatten().collect();
    events.sort_by(|a, b| b.id.cmp(&a.id));
    events.dedup_by_key(|e| e.id);
    events
}

/// Keeps only release events and tag creations.
pub fn filter_releases(events: Vec<GlobalEvent>) -> Vec<GlobalEvent> {
    events.into_iter().filter(GlobalEvent::is_release).collect()
}
