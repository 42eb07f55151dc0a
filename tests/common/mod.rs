//! Common test utilities and fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use inbox_triage::client::{
    AuthResponse, DeleteOutcome, LoginRequest, RegisterRequest, TriageApi,
};
use inbox_triage::error::{Result, TriageError};
use inbox_triage::models::{DeleteUsage, EmailCount, ScanRecord};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Create a scan record with default values
pub fn record(index: u32, pred: &str) -> ScanRecord {
    ScanRecord {
        index,
        date: format!("2023-06-{:02} 09:00:00", (index % 28) + 1),
        subject: format!("subject {}", index),
        sender: format!("sender{}@example.com", index),
        body: String::new(),
        pred: pred.to_string(),
    }
}

/// The three-record example from the review workflow: two personal
/// messages around one ad.
pub fn sample_records() -> Vec<ScanRecord> {
    vec![record(1, "개인"), record(2, "광고"), record(3, "개인")]
}

/// Stub backend whose classification responses are gated on oneshot
/// channels, keyed by the scanned address. Lets a test decide the
/// order in which overlapping scan fetches resolve.
pub struct GatedApi {
    batches: Mutex<HashMap<String, (oneshot::Receiver<()>, Result<Vec<ScanRecord>>)>>,
}

impl GatedApi {
    /// Prepare one gated response per (email, outcome) pair. Returned
    /// senders release the matching response when fired.
    pub fn new(
        scripted: Vec<(&str, Result<Vec<ScanRecord>>)>,
    ) -> (Self, HashMap<String, oneshot::Sender<()>>) {
        let mut batches = HashMap::new();
        let mut gates = HashMap::new();
        for (email, outcome) in scripted {
            let (tx, rx) = oneshot::channel();
            batches.insert(email.to_string(), (rx, outcome));
            gates.insert(email.to_string(), tx);
        }
        (
            Self {
                batches: Mutex::new(batches),
            },
            gates,
        )
    }
}

#[async_trait]
impl TriageApi for GatedApi {
    async fn register(&self, _request: &RegisterRequest) -> Result<AuthResponse> {
        Err(TriageError::Unknown("not scripted".to_string()))
    }

    async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse> {
        Err(TriageError::Unknown("not scripted".to_string()))
    }

    async fn link_email(
        &self,
        _user_no: i64,
        _email_address: &str,
        _password: &str,
    ) -> Result<()> {
        Ok(())
    }

    async fn email_counts(&self, _user_no: i64) -> Result<Vec<EmailCount>> {
        Ok(Vec::new())
    }

    async fn classify_inbox(&self, _user_no: i64, email_id: &str) -> Result<Vec<ScanRecord>> {
        let entry = self
            .batches
            .lock()
            .expect("batches lock poisoned")
            .remove(email_id);

        let (gate, outcome) = entry
            .unwrap_or_else(|| panic!("no scripted response for {}", email_id));

        // Suspend until the test releases this response.
        let _ = gate.await;
        outcome
    }

    async fn delete_usage(&self, _user_no: i64) -> Result<Option<DeleteUsage>> {
        Ok(None)
    }

    async fn delete_messages(
        &self,
        _user_no: i64,
        _email_id: &str,
        indices: &[u32],
    ) -> Result<DeleteOutcome> {
        Ok(DeleteOutcome {
            deleted: indices.len() as u64,
        })
    }
}

/// Immediate stub backend with a fixed scan result and usage record.
pub struct StubApi {
    pub records: Vec<ScanRecord>,
    pub usage: Option<DeleteUsage>,
}

impl StubApi {
    pub fn new(records: Vec<ScanRecord>) -> Self {
        Self {
            records,
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: DeleteUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

#[async_trait]
impl TriageApi for StubApi {
    async fn register(&self, _request: &RegisterRequest) -> Result<AuthResponse> {
        Err(TriageError::Unknown("not scripted".to_string()))
    }

    async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse> {
        Err(TriageError::Unknown("not scripted".to_string()))
    }

    async fn link_email(
        &self,
        _user_no: i64,
        _email_address: &str,
        _password: &str,
    ) -> Result<()> {
        Ok(())
    }

    async fn email_counts(&self, _user_no: i64) -> Result<Vec<EmailCount>> {
        Ok(Vec::new())
    }

    async fn classify_inbox(&self, _user_no: i64, _email_id: &str) -> Result<Vec<ScanRecord>> {
        Ok(self.records.clone())
    }

    async fn delete_usage(&self, _user_no: i64) -> Result<Option<DeleteUsage>> {
        Ok(self.usage)
    }

    async fn delete_messages(
        &self,
        _user_no: i64,
        _email_id: &str,
        indices: &[u32],
    ) -> Result<DeleteOutcome> {
        Ok(DeleteOutcome {
            deleted: indices.len() as u64,
        })
    }
}
