//! View-state helpers shared by the dashboard surfaces.
//!
//! `Panel` is the settled state of one independently fetched slice of a view. The
//! generation guard keeps a slow, older response from overwriting a newer one when a
//! user re-queries faster than the backend answers.

use crate::client::error::ApiError;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum Panel<T> {
    Ready(T),
    /// Backend answered `found: false` or had nothing to show.
    NotFound { message: String },
    Failed { message: String },
}

impl<T> Panel<T> {
    pub fn from_result(res: Result<T, ApiError>) -> Self {
        match res {
            Ok(v) => Self::Ready(v),
            Err(err) => Self::failed(&err),
        }
    }

    pub fn failed(err: &ApiError) -> Self {
        Self::Failed {
            message: err.to_string(),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct QueryToken(u64);

#[derive(Debug, Default)]
pub struct QueryGeneration {
    latest: AtomicU64,
}

impl QueryGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new query; every token issued before this one becomes stale.
    pub fn issue(&self) -> QueryToken {
        QueryToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: QueryToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

/// Holds the value a view is showing, accepting only responses to the latest query.
#[derive(Debug, Default)]
pub struct ViewSlot<T> {
    generation: QueryGeneration,
    value: Mutex<Option<(QueryToken, T)>>,
}

impl<T: Clone> ViewSlot<T> {
    pub fn new() -> Self {
        Self {
            generation: QueryGeneration::new(),
            value: Mutex::new(None),
        }
    }

    pub fn begin(&self) -> QueryToken {
        self.generation.issue()
    }

    /// Returns false (and drops `value`) when a newer query was begun after `token`.
    pub fn apply(&self, token: QueryToken, value: T) -> bool {
        let mut slot = self.value.lock().unwrap_or_else(|e| e.into_inner());
        if !self.generation.is_current(token) {
            tracing::debug!(?token, "discarding stale response");
            return false;
        }
        *slot = Some((token, value));
        true
    }

    pub fn current(&self) -> Option<T> {
        self.value
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|(_, v)| v.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn later_token_invalidates_earlier_one() {
        let gen = QueryGeneration::new();
        let a = gen.issue();
        assert!(gen.is_current(a));
        let b = gen.issue();
        assert!(b > a);
        assert!(!gen.is_current(a));
        assert!(gen.is_current(b));
    }

    #[test]
    fn stale_response_resolving_last_is_discarded() {
        let slot = ViewSlot::new();
        let first = slot.begin();
        let second = slot.begin();

        // Second query answers first, then the slow first query lands.
        assert!(slot.apply(second, "Department of Education"));
        assert!(!slot.apply(first, "Parks and Recreation"));
        assert_eq!(slot.current(), Some("Department of Education"));
    }

    #[test]
    fn panel_serializes_with_state_tag() {
        let ready: Panel<Vec<u32>> = Panel::Ready(vec![1, 2]);
        assert_eq!(
            serde_json::to_value(&ready).unwrap(),
            json!({"state": "ready", "data": [1, 2]})
        );

        let failed: Panel<u32> = Panel::from_result(Err(ApiError::Http {
            status: 503,
            message: "HTTP error 503".into(),
        }));
        assert!(failed.is_failed());
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"state": "failed", "data": {"message": "HTTP error 503"}})
        );
    }
}
