use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user as returned by the backend.
///
/// The credential hash never leaves the backend; only the numeric
/// account number, login id and display name travel on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub no: i64,
    pub id: String,
    pub name: String,
    #[serde(rename = "isConnectionEmail", default)]
    pub is_connection_email: bool,
}

/// An external email address linked to a user account.
///
/// Only the zeroth link is active for scanning; the rest are kept for
/// display until the backend grows multi-account support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailLink {
    pub email_address: String,
    pub linked_at: DateTime<Utc>,
}

impl EmailLink {
    pub fn new(email_address: impl Into<String>) -> Self {
        Self {
            email_address: email_address.into(),
            linked_at: Utc::now(),
        }
    }
}

/// One classified message from a scan.
///
/// `pred` is carried verbatim from the classifier; it is matched
/// against the category catalog only at display time, so a label the
/// catalog does not know survives the round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub index: u32,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub body: String,
    pub pred: String,
}

/// Inbox count for one linked address.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmailCount {
    pub email_address: String,
    #[serde(rename = "emailCount")]
    pub email_count: u64,
}

/// Deletion-usage record for an account.
///
/// The review flow only cares whether this record exists at all; the
/// count is shown for context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DeleteUsage {
    #[serde(rename = "deleteCount")]
    pub delete_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_record_deserializes_wire_shape() {
        let json = r#"{
            "index": 3,
            "date": "2023-06-14 09:12:00",
            "subject": "주간 뉴스",
            "sender": "news@example.com",
            "body": "...",
            "pred": "뉴스레터"
        }"#;

        let record: ScanRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.index, 3);
        assert_eq!(record.pred, "뉴스레터");
        assert_eq!(record.sender, "news@example.com");
    }

    #[test]
    fn test_scan_record_tolerates_missing_body() {
        let json = r#"{"index": 1, "pred": "개인"}"#;
        let record: ScanRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.body, "");
        assert_eq!(record.date, "");
    }

    #[test]
    fn test_email_count_wire_key() {
        let json = r#"{"email_address": "a@b.com", "emailCount": 120}"#;
        let count: EmailCount = serde_json::from_str(json).unwrap();
        assert_eq!(count.email_count, 120);
    }

    #[test]
    fn test_delete_usage_wire_key() {
        let json = r#"{"deleteCount": 0}"#;
        let usage: DeleteUsage = serde_json::from_str(json).unwrap();
        assert_eq!(usage.delete_count, 0);
    }

    #[test]
    fn test_user_connection_flag_defaults_off() {
        let json = r#"{"no": 7, "id": "mina", "name": "Mina"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(!user.is_connection_email);
    }
}
