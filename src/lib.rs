//! Inbox Triage
//!
//! Client-side workflow engine for an email triage service: link an
//! email account, scan and classify its inbox through the backend,
//! review the results per category, and selectively delete messages.
//!
//! # Overview
//!
//! This library provides the complete triage workflow:
//! - **Session**: sign-in state and email-link registry with on-disk persistence
//! - **Scanning**: scan orchestration over the backend classification endpoint
//! - **Categories**: the fixed category catalog, tab state and category filter
//! - **Review**: interactive per-category review with delete exclusion
//! - **Usage gate**: first-use detection for the deletion workflow
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use inbox_triage::client::HttpTriageClient;
//! use inbox_triage::config::Config;
//! use inbox_triage::scan::{ScanOrchestrator, ScanStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml".as_ref()).await?;
//!     let client = Arc::new(HttpTriageClient::new(
//!         config.base_url()?,
//!         config.timeout(),
//!         config.scan.max_concurrent_requests,
//!         config.scan.max_attempts,
//!     )?);
//!
//!     let store = Arc::new(ScanStore::new());
//!     let orchestrator = ScanOrchestrator::new(client, Arc::clone(&store));
//!     let summary = orchestrator.run_scan(1, "user@example.com").await?;
//!     println!("{} messages classified", summary.total);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`categories`] - Category catalog, tab state machine, category filter
//! - [`cli`] - Command-line interface and command handlers
//! - [`client`] - Backend REST client with retry logic
//! - [`config`] - Configuration management
//! - [`error`] - Error types and result alias
//! - [`models`] - Core data structures
//! - [`review`] - Interactive review session
//! - [`scan`] - Scan orchestration and the scan result store
//! - [`session`] - Signed-in session state
//! - [`usage`] - First-use gating for deletion

pub mod categories;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod review;
pub mod scan;
pub mod session;
pub mod usage;

// Re-export commonly used types for convenience
pub use error::{Result, TriageError};

// Core data models
pub use models::{DeleteUsage, EmailCount, EmailLink, ScanRecord, User};

// Category types
pub use categories::{filter_by_category, unclassified, Category, TabState};

// Client traits
pub use client::{HttpTriageClient, TriageApi};

// Scan types
pub use scan::{ScanOrchestrator, ScanStore, ScanSummary};

// Session state
pub use session::Session;

// Usage gate
pub use usage::{resolve_usage_state, UsageState};

// Review types
pub use review::{ReviewOutcome, ReviewSession};

// CLI types (for binary usage)
pub use cli::{Cli, Commands};
