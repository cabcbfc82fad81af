use std::fmt;
use std::io::Error;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

use crate::filter::SearchMode;

pub const HELP_TEXT: &str = "\
Tab / Shift-Tab   Cycle focus: filters, search, table
Up / Down (k/j)   Move cursor
Space / Enter     Toggle the filter under the cursor
PgUp / PgDn       Scroll the table by a page
Home / End        Jump to the first / last row
r                 Reset all filters and the search
?                 Show this help
Esc               Close help / leave the search box
q                 Quit";

#[derive(Debug)]
pub enum DTError {
    IoError(Error),
    JsonError(serde_json::Error),
    InvalidDataset(String),
    InvalidArgument(String),
    FileNotFound,
    PermissionDenied,
}

impl fmt::Display for DTError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DTError::IoError(e) => write!(f, "io error: {e}"),
            DTError::JsonError(e) => write!(f, "malformed json: {e}"),
            DTError::InvalidDataset(reason) => write!(f, "invalid dataset: {reason}"),
            DTError::InvalidArgument(reason) => write!(f, "invalid argument: {reason}"),
            DTError::FileNotFound => write!(f, "file not found"),
            DTError::PermissionDenied => write!(f, "permission denied"),
        }
    }
}

impl std::error::Error for DTError {}

impl From<Error> for DTError {
    fn from(err: Error) -> Self {
        DTError::IoError(err)
    }
}

impl From<serde_json::Error> for DTError {
    fn from(err: serde_json::Error) -> Self {
        DTError::JsonError(err)
    }
}

#[derive(Debug, Clone, Setters)]
pub struct TableConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
    pub panel_width: usize,
    pub search_mode: SearchMode,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 32,
            panel_width: 28,
            search_mode: SearchMode::Legacy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Panel,
    Search,
    Table,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Panel => Focus::Search,
            Focus::Search => Focus::Table,
            Focus::Table => Focus::Panel,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Focus::Panel => Focus::Table,
            Focus::Search => Focus::Panel,
            Focus::Table => Focus::Search,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    Help,
    Exit,
    NextFocus,
    PreviousFocus,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    Toggle,
    Reset,
    Resize(usize, usize),
    RawKey(KeyEvent),
}
