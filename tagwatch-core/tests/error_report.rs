use std::sync::{Arc, Mutex};

use tagwatch_core::error::FetchError;
use tagwatch_core::error_report::{ErrorClass, ErrorGroup, FetchErrors};
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut msg = String::new();
        let mut visitor = |field: &tracing::field::Field, value: &dyn std::fmt::Debug| {
            use std::fmt::Write as _;
            let _ = write!(&mut msg, "{}={:?} ", field.name(), value);
        };
        event.record(&mut visitor);
        self.events.lock().unwrap().push(msg);
    }
}

fn collect<F: FnOnce()>(f: F) -> Vec<String> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = Registry::default().with(EventCollector {
        events: events.clone(),
    });
    tracing::subscriber::with_default(subscriber, f);
    let collected = events.lock().unwrap().clone();
    collected
}

#[test]
fn test_no_errors_logs_nothing() {
    let errors = FetchErrors::new();
    let events = collect(|| errors.log("fetchTagsErrors"));
    assert!(events.is_empty(), "expected no records, got {events:?}");
    assert!(errors.summary().is_empty());
}

#[test]
fn test_push_tags_error_with_repo() {
    let mut errors = FetchErrors::new();
    errors.push("owner/a", FetchError::bad_request(404));
    assert_eq!(errors.errors().len(), 1);
    assert_eq!(errors.errors()[0].repo.as_deref(), Some("owner/a"));
    assert_eq!(errors.errors()[0].to_string(), "bad request 404 (owner/a)");
}

#[test]
fn test_summary_groups_by_class() {
    let mut errors = FetchErrors::new();
    errors.push("owner/a", FetchError::bad_response(503));
    errors.push("owner/b", FetchError::bad_request(404));
    errors.push("owner/c", FetchError::unknown("timeout"));
    errors.push("owner/d", FetchError::bad_response(429));
    errors.push("owner/e", FetchError::no_entries());

    assert_eq!(
        errors.summary(),
        vec![
            ErrorGroup {
                class: ErrorClass::BadResponse,
                details: vec![
                    ("owner/a".into(), "503".into()),
                    ("owner/d".into(), "429".into()),
                ],
            },
            ErrorGroup {
                class: ErrorClass::BadRequest,
                details: vec![("owner/b".into(), "404".into())],
            },
            ErrorGroup {
                class: ErrorClass::Other,
                details: vec![
                    ("owner/c".into(), "unknown: timeout".into()),
                    ("owner/e".into(), "no entries".into()),
                ],
            },
        ]
    );
}

#[test]
fn test_log_emits_count_and_details_per_non_empty_class() {
    let mut errors = FetchErrors::new();
    errors.push("owner/a", FetchError::bad_response(500));
    errors.push("owner/b", FetchError::bad_response(502));
    errors.push("owner/c", FetchError::unknown("connection reset"));

    let events = collect(|| errors.log("fetchTagsErrors"));
    assert_eq!(events.len(), 4, "two records per non-empty class: {events:?}");
    assert!(events[0].contains("fetchTagsErrorsBadResponse") && events[0].contains("count=2"));
    assert!(events[1].contains("fetchTagsErrorsBadResponseDetails") && events[1].contains("owner/b"));
    assert!(events[2].contains("fetchTagsErrorsOther") && events[2].contains("count=1"));
    assert!(events[3].contains("fetchTagsErrorsOtherDetails") && events[3].contains("connection reset"));
    assert!(!events.iter().any(|e| e.contains("BadRequest")));
}
