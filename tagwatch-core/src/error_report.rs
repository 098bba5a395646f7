//! Error Aggregator: collects per-repository fetch failures over a batch and logs one
//! summary per error class instead of one line per repository.

use tracing::warn;

use crate::error::{FetchError, FetchErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadResponse,
    BadRequest,
    Other,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::BadResponse => "BadResponse",
            ErrorClass::BadRequest => "BadRequest",
            ErrorClass::Other => "Other",
        }
    }

    fn of(kind: &FetchErrorKind) -> Self {
        match kind {
            FetchErrorKind::BadResponse(_) => ErrorClass::BadResponse,
            FetchErrorKind::BadRequest(_) => ErrorClass::BadRequest,
            FetchErrorKind::Unknown(_) | FetchErrorKind::NoEntries => ErrorClass::Other,
        }
    }
}

/// All errors of one class: `(repo, status-or-detail)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorGroup {
    pub class: ErrorClass,
    pub details: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct FetchErrors {
    errors: Vec<FetchError>,
}

impl FetchErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, repo: &str, mut error: FetchError) {
        error.repo = Some(repo.to_string());
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[FetchError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Non-empty groups, in `BadResponse`, `BadRequest`, `Other` order.
    pub fn summary(&self) -> Vec<ErrorGroup> {
        [ErrorClass::BadResponse, ErrorClass::BadRequest, ErrorClass::Other]
            .into_iter()
            .filter_map(|class| {
                let details: Vec<(String, String)> = self
                    .errors
                    .iter()
                    .filter(|e| ErrorClass::of(&e.kind) == class)
                    .map(|e| {
                        let repo = e.repo.clone().unwrap_or_default();
                        let detail = match e.status() {
                            Some(status) => status.to_string(),
                            None => e.kind.to_string(),
                        };
                        (repo, detail)
                    })
                    .collect();
                (!details.is_empty()).then_some(ErrorGroup { class, details })
            })
            .collect()
    }

    /// Emits a count record and a details record for every non-empty class.
    pub fn log(&self, prefix: &str) {
        for group in self.summary() {
            let name = format!("{prefix}{}", group.class.as_str());
            warn!(name = %name, count = group.details.len(), "{name}");
            let details_name = format!("{name}Details");
            warn!(name = %details_name, errors = ?group.details, "{details_name}");
        }
    }
}
