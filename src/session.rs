//! Signed-in session state with on-disk persistence
//!
//! The session is an explicit value handed to the workflow functions;
//! nothing in the crate reads user identity from ambient state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, TriageError};
use crate::models::{EmailLink, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub user: User,
    pub access_token: String,
    pub email_links: Vec<EmailLink>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Start a session from a successful register/login response.
    pub fn start(user: User, access_token: String) -> Self {
        let now = Utc::now();
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            user,
            access_token,
            email_links: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn user_no(&self) -> i64 {
        self.user.no
    }

    /// The address used for scanning. Only the zeroth link is active.
    pub fn active_email(&self) -> Result<&str> {
        self.email_links
            .first()
            .map(|link| link.email_address.as_str())
            .ok_or(TriageError::NoLinkedEmail)
    }

    pub fn has_link(&self) -> bool {
        !self.email_links.is_empty()
    }

    /// Record a newly linked address. Re-linking the same address moves
    /// it to the front so it becomes the active one.
    pub fn add_link(&mut self, email_address: impl Into<String>) {
        let email_address = email_address.into();
        self.email_links
            .retain(|link| link.email_address != email_address);
        self.email_links.insert(0, EmailLink::new(email_address));
        self.user.is_connection_email = true;
        self.updated_at = Utc::now();
    }

    /// Save the session to disk
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        tracing::debug!("Saved session to {:?}", path);
        Ok(())
    }

    /// Load the session from disk
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TriageError::Session(format!(
                "No session at {:?}; run `inbox-triage register` or `inbox-triage login` first",
                path
            )));
        }

        let json = tokio::fs::read_to_string(path).await?;
        let session: Self = serde_json::from_str(&json)?;

        tracing::info!(
            "Loaded session: user_no={}, links={}",
            session.user.no,
            session.email_links.len()
        );

        Ok(session)
    }

    /// Remove the session file (logout)
    pub async fn remove(path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
