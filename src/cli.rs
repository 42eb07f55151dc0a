//! Command-line interface

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::client::{HttpTriageClient, LoginRequest, RegisterRequest, TriageApi};
use crate::config::Config;
use crate::error::{Result, TriageError};
use crate::review::{ReviewOutcome, ReviewSession};
use crate::scan::{ScanOrchestrator, ScanStore, ScanSummary};
use crate::session::Session;
use crate::usage::{fetch_usage_state, UsageState};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

#[derive(Parser, Debug)]
#[command(name = "inbox-triage")]
#[command(version)]
#[command(about = "Scan, review and clean a linked email inbox", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override the session file location
    #[arg(long)]
    pub session_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account and sign in
    Register,

    /// Sign in to an existing account
    Login,

    /// Sign out and discard the local session
    Logout,

    /// Link an external email address for scanning
    Link {
        /// Address to link; prompted for when omitted
        address: Option<String>,
    },

    /// Show the linked address, inbox count and usage history
    Status,

    /// Scan the linked inbox and show classification counts
    Scan,

    /// Scan, review per category, and delete the checked messages
    Review {
        /// Skip the final deletion confirmation
        #[arg(long)]
        yes: bool,
    },
}

/// Spinner shown while a backend fetch is outstanding
fn fetch_spinner(msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed:>6}] {msg}")
            .unwrap()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
    );
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_summary(summary: &ScanSummary) {
    println!("Scan complete: {} messages", summary.total);
    for (category, count) in &summary.per_category {
        println!("  {} {:<6} {:>5}", category.icon(), category.label(), count);
    }
    if summary.unclassified > 0 {
        println!("  ⚠ 미분류   {:>5}", summary.unclassified);
    }
}

/// Build the production client from config.
pub fn build_client(config: &Config) -> Result<Arc<HttpTriageClient>> {
    let client = HttpTriageClient::new(
        config.base_url()?,
        config.timeout(),
        config.scan.max_concurrent_requests,
        config.scan.max_attempts,
    )?;
    Ok(Arc::new(client))
}

async fn load_session(client: &HttpTriageClient, path: &Path) -> Result<Session> {
    let session = Session::load(path).await?;
    client.set_token(session.access_token.clone());
    Ok(session)
}

pub async fn cmd_register(client: Arc<HttpTriageClient>, session_path: &Path) -> Result<()> {
    let id = inquire::Text::new("아이디:")
        .prompt()
        .map_err(|e| TriageError::Cancelled(e.to_string()))?;
    let name = inquire::Text::new("이름:")
        .prompt()
        .map_err(|e| TriageError::Cancelled(e.to_string()))?;
    let password = inquire::Password::new("비밀번호:")
        .prompt()
        .map_err(|e| TriageError::Cancelled(e.to_string()))?;

    let auth = client
        .register(&RegisterRequest { id, name, password })
        .await?;

    let session = Session::start(auth.user, auth.access_token);
    session.save(session_path).await?;

    println!("환영합니다, {}님! 계정이 생성되었습니다.", session.user.name);
    println!("다음 단계: `inbox-triage link` 로 이메일 계정을 연동하세요.");
    Ok(())
}

pub async fn cmd_login(client: Arc<HttpTriageClient>, session_path: &Path) -> Result<()> {
    let id = inquire::Text::new("아이디:")
        .prompt()
        .map_err(|e| TriageError::Cancelled(e.to_string()))?;
    let password = inquire::Password::new("비밀번호:")
        .without_confirmation()
        .prompt()
        .map_err(|e| TriageError::Cancelled(e.to_string()))?;

    let auth = client.login(&LoginRequest { id, password }).await?;
    let mut session = Session::start(auth.user, auth.access_token);

    // The backend knows the linked addresses; rebuild the local link
    // list from the count endpoint so `scan` works right after login.
    if session.user.is_connection_email {
        let counts = client.email_counts(session.user_no()).await?;
        for count in counts.iter().rev() {
            session.add_link(count.email_address.clone());
        }
    }

    session.save(session_path).await?;
    println!("로그인되었습니다: {}", session.user.name);
    Ok(())
}

pub async fn cmd_logout(session_path: &Path) -> Result<()> {
    Session::remove(session_path).await?;
    println!("로그아웃되었습니다.");
    Ok(())
}

pub async fn cmd_link(
    client: Arc<HttpTriageClient>,
    session_path: &Path,
    address: Option<String>,
) -> Result<()> {
    let mut session = load_session(&client, session_path).await?;

    let address = match address {
        Some(address) => address,
        None => inquire::Text::new("연동할 이메일 주소:")
            .prompt()
            .map_err(|e| TriageError::Cancelled(e.to_string()))?,
    };

    if !EMAIL_RE.is_match(&address) {
        return Err(TriageError::BadRequest(format!(
            "'{}' is not a valid email address",
            address
        )));
    }

    let password = inquire::Password::new("메일함 비밀번호 (앱 비밀번호):")
        .without_confirmation()
        .prompt()
        .map_err(|e| TriageError::Cancelled(e.to_string()))?;

    client
        .link_email(session.user_no(), &address, &password)
        .await?;

    session.add_link(address.clone());
    session.save(session_path).await?;

    info!("Linked {} for user {}", address, session.user_no());
    println!("{} 계정이 연동되었습니다.", address);
    Ok(())
}

pub async fn cmd_status(client: Arc<HttpTriageClient>, session_path: &Path) -> Result<()> {
    let session = load_session(&client, session_path).await?;

    if !session.has_link() {
        println!("연동된 이메일이 없습니다. `inbox-triage link` 를 먼저 실행하세요.");
        return Ok(());
    }

    let spinner = fetch_spinner("인박스 정보를 가져오고 있습니다...");
    let fetched = futures::try_join!(
        client.email_counts(session.user_no()),
        fetch_usage_state(client.as_ref(), session.user_no()),
    );
    spinner.finish_and_clear();
    let (counts, usage) = fetched?;

    println!("사용자: {} (no. {})", session.user.name, session.user_no());
    for count in &counts {
        println!("  {:<32} {:>6} 통", count.email_address, count.email_count);
    }
    match usage {
        UsageState::FirstUse => println!("삭제 이력: 없음 (첫 사용)"),
        UsageState::HasHistory { deleted } => println!("삭제 이력: {} 통 삭제됨", deleted),
    }
    Ok(())
}

pub async fn cmd_scan(client: Arc<HttpTriageClient>, session_path: &Path) -> Result<()> {
    let session = load_session(&client, session_path).await?;
    let email_id = session.active_email()?.to_string();

    let store = Arc::new(ScanStore::new());
    let orchestrator = ScanOrchestrator::new(client, Arc::clone(&store));

    let spinner = fetch_spinner("메일을 분류하고 있습니다...");
    let result = orchestrator.run_scan(session.user_no(), &email_id).await;
    spinner.finish_and_clear();

    let summary = result?;
    print_summary(&summary);
    Ok(())
}

pub async fn cmd_review(
    client: Arc<HttpTriageClient>,
    session_path: &Path,
    skip_confirm: bool,
) -> Result<()> {
    let session = load_session(&client, session_path).await?;
    let email_id = session.active_email()?.to_string();
    let user_no = session.user_no();

    // Usage gate is fetched once, on entry.
    let usage = fetch_usage_state(client.as_ref(), user_no).await?;

    let store = Arc::new(ScanStore::new());
    let scan_client: Arc<dyn TriageApi> = client.clone();
    let orchestrator = ScanOrchestrator::new(scan_client, store);

    let spinner = fetch_spinner("메일을 분류하고 있습니다...");
    let result = orchestrator.run_scan(user_no, &email_id).await;
    spinner.finish_and_clear();
    let summary = result?;

    if summary.total == 0 {
        println!("분류할 메일이 없습니다.");
        return Ok(());
    }
    print_summary(&summary);

    let mut review = ReviewSession::new(orchestrator.store().snapshot(), usage);
    let indices = match review.run()? {
        ReviewOutcome::Delete(indices) => indices,
        ReviewOutcome::Abort => {
            println!("삭제를 취소했습니다.");
            return Ok(());
        }
    };

    if indices.is_empty() {
        println!("삭제 대상으로 체크된 메일이 없습니다.");
        return Ok(());
    }

    if !skip_confirm {
        let confirmed = inquire::Confirm::new(&format!(
            "{} 통의 메일을 삭제할까요?",
            indices.len()
        ))
        .with_default(false)
        .prompt()
        .map_err(|e| TriageError::Cancelled(e.to_string()))?;

        if !confirmed {
            println!("삭제를 취소했습니다.");
            return Ok(());
        }
    }

    let outcome = client.delete_messages(user_no, &email_id, &indices).await?;
    info!("Deleted {} messages for user {}", outcome.deleted, user_no);
    println!("{} 통의 메일을 삭제했습니다. 🎉", outcome.deleted);
    Ok(())
}
