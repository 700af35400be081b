//! Per-session log of completed analyses, newest first and capped at
//! [`MAX_HISTORY_ITEMS`] entries.

pub mod handlers;
pub mod session;
pub mod store;

pub use session::{Session, SessionId};
pub use store::{MemorySessionStore, SessionStore};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::analysis::InputKind;
use crate::credibility::AnalysisResult;

pub const HISTORY_KEY: &str = "analysisHistory";

/// Older entries are dropped once a session holds this many.
pub const MAX_HISTORY_ITEMS: usize = 50;

const TITLE_SUMMARY_CHARS: usize = 50;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("stored history is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HistorySource {
    #[serde(rename = "type")]
    pub kind: InputKind,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoryItem {
    pub id: String,
    pub source: HistorySource,
    pub result: AnalysisResult,
    pub timestamp: DateTime<Utc>,
    pub title: String,
}

impl HistoryItem {
    pub fn new(source: HistorySource, result: AnalysisResult) -> Self {
        let timestamp = Utc::now();
        let title = history_title(&source, &result);
        Self {
            id: history_id(timestamp),
            source,
            result,
            timestamp,
            title,
        }
    }
}

/// URL submissions are titled by their URL, text submissions by the start
/// of the summary.
pub fn history_title(source: &HistorySource, result: &AnalysisResult) -> String {
    match source.kind {
        InputKind::Url => source.value.trim().to_string(),
        InputKind::Text => {
            let head: String = result
                .article_summary
                .chars()
                .take(TITLE_SUMMARY_CHARS)
                .collect();
            format!("{head}...")
        }
    }
}

fn history_id(timestamp: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}",
        timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
        &suffix[..8]
    )
}

pub struct HistoryLog {
    store: Arc<dyn SessionStore>,
    // serializes read-modify-write of the stored list
    write_lock: Mutex<()>,
}

impl HistoryLog {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn record(
        &self,
        session: &SessionId,
        source: HistorySource,
        result: AnalysisResult,
    ) -> Result<HistoryItem, HistoryError> {
        let item = HistoryItem::new(source, result);

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut items = self.list(session)?;
        items.insert(0, item.clone());
        items.truncate(MAX_HISTORY_ITEMS);
        self.store
            .set(session, HISTORY_KEY, serde_json::to_value(&items)?);

        debug!(%session, id = %item.id, entries = items.len(), "recorded analysis");
        Ok(item)
    }

    pub fn list(&self, session: &SessionId) -> Result<Vec<HistoryItem>, HistoryError> {
        match self.store.get(session, HISTORY_KEY) {
            Some(value) => serde_json::from_value(value).map_err(|err| {
                warn!(%session, error = %err, "history entry failed to deserialize");
                HistoryError::from(err)
            }),
            None => Ok(Vec::new()),
        }
    }

    pub fn get(&self, session: &SessionId, id: &str) -> Result<Option<HistoryItem>, HistoryError> {
        Ok(self.list(session)?.into_iter().find(|item| item.id == id))
    }

    pub fn clear(&self, session: &SessionId) {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.store.clear(session, HISTORY_KEY);
    }
}
