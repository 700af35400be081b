use std::sync::Arc;

use crate::analysis::Analyzer;
use crate::history::{HistoryLog, MemorySessionStore};

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub history: Arc<HistoryLog>,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            history: Arc::new(HistoryLog::new(Arc::new(MemorySessionStore::new()))),
        }
    }
}
