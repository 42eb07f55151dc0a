//! Scan orchestration and the in-memory scan result store

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::{info, warn};

use crate::categories::{unclassified, Category};
use crate::client::TriageApi;
use crate::error::Result;
use crate::models::ScanRecord;

/// Holds the most recent scan's records for the current session.
///
/// Each completed scan replaces the contents wholesale; records are
/// never merged across scans or mutated individually. When scans
/// overlap, whichever response arrives last wins.
#[derive(Debug, Default)]
pub struct ScanStore {
    records: RwLock<Vec<ScanRecord>>,
}

impl ScanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire contents; the previous records are discarded.
    pub fn replace(&self, records: Vec<ScanRecord>) {
        *self.records.write().expect("scan store lock poisoned") = records;
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Vec<ScanRecord> {
        self.records.read().expect("scan store lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("scan store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counts derived from one scan, for display after the fetch resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub total: usize,
    pub per_category: Vec<(Category, usize)>,
    pub unclassified: usize,
}

impl ScanSummary {
    pub fn of(records: &[ScanRecord]) -> Self {
        let per_category = Category::ALL
            .iter()
            .map(|&category| {
                let count = records
                    .iter()
                    .filter(|r| r.pred == category.label())
                    .count();
                (category, count)
            })
            .collect();

        Self {
            total: records.len(),
            per_category,
            unclassified: unclassified(records).len(),
        }
    }
}

/// Drives the scan-and-populate sequence.
///
/// `run_scan` resolves only after the store has been repopulated (or
/// the failure observed), so a caller never reads a half-updated
/// store by gating on the returned future. The in-progress flag is
/// for display only.
pub struct ScanOrchestrator {
    client: Arc<dyn TriageApi>,
    store: Arc<ScanStore>,
    in_progress: AtomicBool,
}

impl ScanOrchestrator {
    pub fn new(client: Arc<dyn TriageApi>, store: Arc<ScanStore>) -> Self {
        Self {
            client,
            store,
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &ScanStore {
        &self.store
    }

    /// Whether a scan fetch is currently outstanding.
    pub fn is_scanning(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Run one scan: request classification, then replace the store.
    ///
    /// On failure the store keeps its previous contents and the error
    /// is returned to the caller as well as logged. Overlapping calls
    /// are not cancelled; the last response to arrive determines the
    /// final store contents.
    pub async fn run_scan(&self, user_no: i64, email_id: &str) -> Result<ScanSummary> {
        self.in_progress.store(true, Ordering::SeqCst);
        let started = Instant::now();

        match self.client.classify_inbox(user_no, email_id).await {
            Ok(records) => {
                let summary = ScanSummary::of(&records);
                self.store.replace(records);
                self.in_progress.store(false, Ordering::SeqCst);
                info!(
                    "Scan finished: {} messages classified in {:.1}s",
                    summary.total,
                    started.elapsed().as_secs_f32()
                );
                Ok(summary)
            }
            Err(e) => {
                self.in_progress.store(false, Ordering::SeqCst);
                warn!("Scan failed after {:.1}s: {}", started.elapsed().as_secs_f32(), e);
                Err(e)
            }
        }
    }
}
