//! Interactive review of scanned messages
//!
//! Terminal UI for walking the classified scan result one category tab
//! at a time. Every message starts checked (checked = will be
//! deleted); the user unchecks the ones to keep, then submits. Records
//! the classifier labelled outside the catalog get their own bucket so
//! they are never silently invisible.

use crate::categories::{filter_by_category, unclassified, Category, TabState};
use crate::error::{Result, TriageError};
use crate::models::ScanRecord;
use crate::usage::UsageState;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{self, ClearType},
};
use std::collections::HashSet;
use std::io::{self, Write};

/// Label shown on the catch-all bucket for unrecognized predictions.
const UNCLASSIFIED_TAB: &str = "미분류";

/// What the user decided to do with the review screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// Submit deletion of the checked message indices (sorted).
    Delete(Vec<u32>),
    /// Leave without deleting anything.
    Abort,
}

enum SessionAction {
    Continue,
    Quit,
    Submit,
}

/// Interactive review session over one scan result.
pub struct ReviewSession {
    records: Vec<ScanRecord>,
    tabs: TabState,
    on_unclassified_tab: bool,
    /// Indices checked for deletion. All start checked; unchecking a
    /// message excludes it.
    checked: HashSet<u32>,
    cursor: usize,
    usage: UsageState,
}

impl ReviewSession {
    pub fn new(records: Vec<ScanRecord>, usage: UsageState) -> Self {
        let checked = records.iter().map(|r| r.index).collect();
        Self {
            records,
            tabs: TabState::new(),
            on_unclassified_tab: false,
            checked,
            cursor: 0,
            usage,
        }
    }

    /// Records visible on the active tab, in scan order.
    pub fn visible(&self) -> Vec<ScanRecord> {
        if self.on_unclassified_tab {
            unclassified(&self.records)
        } else {
            filter_by_category(&self.records, self.tabs.active())
        }
    }

    /// Switch to a category tab and reset the cursor.
    pub fn select_tab(&mut self, category: Category) {
        self.tabs.select(category.label());
        self.on_unclassified_tab = false;
        self.cursor = 0;
    }

    /// Switch to the catch-all bucket.
    pub fn select_unclassified_tab(&mut self) {
        self.on_unclassified_tab = true;
        self.cursor = 0;
    }

    pub fn active_tab_label(&self) -> &str {
        if self.on_unclassified_tab {
            UNCLASSIFIED_TAB
        } else {
            self.tabs.active()
        }
    }

    pub fn is_checked(&self, index: u32) -> bool {
        self.checked.contains(&index)
    }

    /// Toggle the checkbox under the cursor.
    pub fn toggle_current(&mut self) {
        if let Some(record) = self.visible().get(self.cursor) {
            let index = record.index;
            if !self.checked.remove(&index) {
                self.checked.insert(index);
            }
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let position = self.cursor as isize + delta;
        self.cursor = position.clamp(0, len as isize - 1) as usize;
    }

    /// Checked indices across every tab, sorted for the wire.
    pub fn marked_for_deletion(&self) -> Vec<u32> {
        let mut indices: Vec<u32> = self.checked.iter().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Run the interactive session until submit or quit.
    pub fn run(&mut self) -> Result<ReviewOutcome> {
        if self.records.is_empty() {
            return Ok(ReviewOutcome::Abort);
        }

        terminal::enable_raw_mode()
            .map_err(|e| TriageError::Unknown(format!("Failed to enable raw mode: {}", e)))?;

        let result = self.run_inner();

        // Always restore terminal
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), cursor::Show);

        result
    }

    fn run_inner(&mut self) -> Result<ReviewOutcome> {
        let mut stdout = io::stdout();

        loop {
            execute!(
                stdout,
                terminal::Clear(ClearType::All),
                cursor::MoveTo(0, 0),
                cursor::Hide
            )
            .map_err(|e| TriageError::Unknown(format!("Terminal error: {}", e)))?;

            self.display_current(&mut stdout)?;
            stdout
                .flush()
                .map_err(|e| TriageError::Unknown(e.to_string()))?;

            // Only handle Press events to avoid key bounce on Windows
            if let Event::Key(key_event) = event::read()
                .map_err(|e| TriageError::Unknown(format!("Input error: {}", e)))?
            {
                if key_event.kind != KeyEventKind::Press {
                    continue;
                }
                match self.handle_key(key_event) {
                    SessionAction::Continue => continue,
                    SessionAction::Quit => return Ok(ReviewOutcome::Abort),
                    SessionAction::Submit => {
                        return Ok(ReviewOutcome::Delete(self.marked_for_deletion()));
                    }
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> SessionAction {
        match key.code {
            KeyCode::Char('1') => self.select_tab(Category::Personal),
            KeyCode::Char('2') => self.select_tab(Category::Alert),
            KeyCode::Char('3') => self.select_tab(Category::Ad),
            KeyCode::Char('4') => self.select_tab(Category::Newsletter),
            KeyCode::Char('0') | KeyCode::Char('u') => self.select_unclassified_tab(),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Char(' ') => self.toggle_current(),
            KeyCode::Char('w') | KeyCode::Enter => return SessionAction::Submit,
            KeyCode::Char('q') | KeyCode::Esc => return SessionAction::Quit,
            _ => {}
        }
        SessionAction::Continue
    }

    fn display_current(&self, stdout: &mut io::Stdout) -> Result<()> {
        // Raw mode needs \r\n, not just \n
        macro_rules! out {
            ($($arg:tt)*) => {
                write!(stdout, "{}\r\n", format!($($arg)*))
                    .map_err(|e| TriageError::Unknown(e.to_string()))?
            };
        }

        out!("스캔 작업을 완료했습니다. 삭제를 원하지 않는 메일은 체크를 해제해 주세요.");
        if self.usage.is_first_use() {
            out!("(처음 사용하시네요: 체크된 메일만 삭제되고, 나머지는 보관함에 남습니다)");
        }
        out!("");

        // Tab row with per-category counts
        let mut tab_row = String::new();
        for category in Category::ALL {
            let count = filter_by_category(&self.records, category.label()).len();
            let marker = if !self.on_unclassified_tab && self.tabs.active() == category.label() {
                '▶'
            } else {
                ' '
            };
            tab_row.push_str(&format!(
                "{}[{}] {} {} ({})  ",
                marker,
                category.id(),
                category.icon(),
                category.label(),
                count
            ));
        }
        let leftovers = unclassified(&self.records).len();
        if leftovers > 0 {
            let marker = if self.on_unclassified_tab { '▶' } else { ' ' };
            tab_row.push_str(&format!("{}[0] {} ({})", marker, UNCLASSIFIED_TAB, leftovers));
        }
        out!("{}", tab_row);
        out!("{}", "─".repeat(72));

        let visible = self.visible();
        if visible.is_empty() {
            out!("  ({} 탭에 메일이 없습니다)", self.active_tab_label());
        }
        for (position, record) in visible.iter().enumerate() {
            let checkbox = if self.is_checked(record.index) { "[x]" } else { "[ ]" };
            let pointer = if position == self.cursor { '>' } else { ' ' };
            out!(
                "{} {} {:>4}  {:<40}  {}",
                pointer,
                checkbox,
                record.index,
                truncate(&record.subject, 40),
                truncate(&record.sender, 24)
            );
        }

        out!("{}", "─".repeat(72));
        out!(
            "체크됨(삭제 대상): {} / {}",
            self.checked.len(),
            self.records.len()
        );
        out!("[1-4] 탭  [0] 미분류  [↑↓/jk] 이동  [space] 체크 전환  [w/enter] 삭제 진행  [q] 취소");

        Ok(())
    }
}

fn truncate(text: &str, max: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max {
        text.to_string()
    } else {
        let mut shortened: String = chars.into_iter().take(max.saturating_sub(1)).collect();
        shortened.push('…');
        shortened
    }
}
