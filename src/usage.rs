//! First-use gating for the deletion workflow
//!
//! Accounts with no deletion history get an explanatory first-use
//! screen instead of the normal review list. Presence of a usage
//! record decides the state; the count itself is display-only.

use crate::client::TriageApi;
use crate::error::Result;
use crate::models::DeleteUsage;

/// Which of the two mutually exclusive review entry states to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageState {
    /// The account has never deleted through the service.
    FirstUse,
    /// The account has prior deletions; `deleted` is the lifetime count.
    HasHistory { deleted: u64 },
}

impl UsageState {
    pub fn is_first_use(&self) -> bool {
        matches!(self, UsageState::FirstUse)
    }
}

/// Resolve the gate from a usage lookup. A present record means
/// history, whatever its count says.
pub fn resolve_usage_state(lookup: Option<DeleteUsage>) -> UsageState {
    match lookup {
        None => UsageState::FirstUse,
        Some(usage) => UsageState::HasHistory {
            deleted: usage.delete_count,
        },
    }
}

/// Fetch the gate state once, on review entry. A failed lookup is
/// returned to the caller so it can offer a retry instead of leaving
/// the screen loading forever.
pub async fn fetch_usage_state(client: &dyn TriageApi, user_no: i64) -> Result<UsageState> {
    let lookup = client.delete_usage(user_no).await?;
    Ok(resolve_usage_state(lookup))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absence_means_first_use() {
        assert_eq!(resolve_usage_state(None), UsageState::FirstUse);
        assert!(resolve_usage_state(None).is_first_use());
    }

    #[test]
    fn test_presence_decides_not_value() {
        // A zero count is still history: the record exists.
        assert_eq!(
            resolve_usage_state(Some(DeleteUsage { delete_count: 0 })),
            UsageState::HasHistory { deleted: 0 }
        );
        assert_eq!(
            resolve_usage_state(Some(DeleteUsage { delete_count: 812 })),
            UsageState::HasHistory { deleted: 812 }
        );
    }
}
