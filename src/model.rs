use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, info, trace, warn};

use crate::domain::{Focus, HELP_TEXT, Message, TableConfig};
use crate::filter::{FilterEngine, SearchMode};
use crate::inputter::{InputResult, Inputter};
use crate::record::Dataset;
use crate::schema::Schema;
use crate::ui::TABLE_CHROME_HEIGHT;
use crate::view::{self, CheckboxGroup, CheckboxPanel};

const PANEL_PAGE_SIZE: usize = 10;

#[derive(Debug, PartialEq)]
pub enum Status {
    Ready,
    Quitting,
}

/// Snapshot of everything the UI draws for one frame.
pub struct UIData {
    pub groups: Vec<CheckboxGroup>,
    pub panel_cursor: usize,
    pub search_label: String,
    pub cmdinput: InputResult,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub table_cursor: usize,
    pub nrows: usize, // Total number of records in the dataset
    pub focus: Focus,
    pub show_popup: bool,
    pub popup_message: String,
    pub search_mode: SearchMode,
    pub status_message: String,
}

pub struct Model {
    pub status: Status,
    dataset: Dataset,
    schema: Schema,
    panel: CheckboxPanel,
    engine: FilterEngine,
    input: Inputter,
    last_input: InputResult,
    focus: Focus,
    show_help: bool,
    panel_cursor: usize,
    table_cursor: usize,
    table_height: usize,
    status_message: String,
}

impl Model {
    /// Schema and filter options are derived here, once, before any
    /// interaction can happen.
    pub fn init(config: &TableConfig, dataset: Dataset, ui_height: usize) -> Self {
        let schema = Schema::infer(dataset.records());
        let panel = CheckboxPanel::build(&schema, &dataset);
        let engine = FilterEngine::new(&dataset, config.search_mode);
        info!(
            "Loaded {} records with {} columns, {} filter options",
            dataset.len(),
            schema.len(),
            panel.len()
        );

        if dataset.is_empty() || schema.is_empty() {
            warn!("Dataset has no records or no fields, the table will be empty");
        }

        let focus = if panel.is_empty() {
            Focus::Search
        } else {
            Focus::Panel
        };
        let status_message = format!("Loaded {} records", dataset.len());
        Self {
            status: Status::Ready,
            dataset,
            schema,
            panel,
            engine,
            input: Inputter::default(),
            last_input: InputResult::default(),
            focus,
            show_help: false,
            panel_cursor: 0,
            table_cursor: 0,
            table_height: ui_height.saturating_sub(TABLE_CHROME_HEIGHT),
            status_message,
        }
    }

    pub fn get_uidata(&self) -> UIData {
        UIData {
            groups: self.panel.groups(self.engine.state()),
            panel_cursor: self.panel_cursor,
            search_label: view::search_label(&self.schema),
            cmdinput: self.last_input.clone(),
            header: view::table_header(&self.schema),
            rows: view::table_rows(&self.schema, &self.dataset, self.visible()),
            table_cursor: self.table_cursor,
            nrows: self.dataset.len(),
            focus: self.focus,
            show_popup: self.show_help,
            popup_message: HELP_TEXT.to_string(),
            search_mode: self.engine.mode(),
            status_message: self.status_message.clone(),
        }
    }

    pub fn raw_keyevents(&self) -> bool {
        self.focus == Focus::Search && !self.show_help
    }

    pub fn visible(&self) -> &[usize] {
        self.engine.visible()
    }

    pub fn quit(&mut self) {
        self.status = Status::Quitting;
    }

    pub fn update(&mut self, message: Message) {
        if self.show_help {
            match message {
                Message::Quit => self.quit(),
                Message::Help | Message::Exit => self.show_help = false,
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            }
            return;
        }

        match message {
            Message::Quit => self.quit(),
            Message::Help => self.show_help = true,
            Message::NextFocus => self.set_focus(self.focus.next()),
            Message::PreviousFocus => self.set_focus(self.focus.previous()),
            Message::Reset => self.reset(),
            Message::Resize(width, height) => self.ui_resize(width, height),
            Message::RawKey(key) => self.raw_input(key),
            Message::Exit => (),
            nav => match self.focus {
                Focus::Panel => self.panel_navigation(nav),
                Focus::Table => self.table_navigation(nav),
                Focus::Search => (),
            },
        }
    }

    // -------------------- Control handling functions ---------------------- //

    fn set_focus(&mut self, focus: Focus) {
        trace!("Focus {:?} -> {:?}", self.focus, focus);
        self.focus = focus;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!("UI was resized! w:{}, h:{}->{}", width, self.table_height, height);
        self.table_height = height.saturating_sub(TABLE_CHROME_HEIGHT);
    }

    fn raw_input(&mut self, key: KeyEvent) {
        if !self.raw_keyevents() {
            return;
        }
        self.last_input = self.input.read(key);
        if self.last_input.changed {
            let query = self.last_input.input.clone();
            self.engine.search(&self.dataset, &self.schema, &query);
            self.clamp_table_cursor();
            self.set_status_message(format!("Search \"{}\"", self.engine.state().query()));
        }
        if self.last_input.finished {
            self.last_input.finished = false;
            self.set_focus(Focus::Table);
        }
    }

    fn reset(&mut self) {
        debug!("Resetting all filters");
        self.engine.reset(&self.dataset);
        self.input.clear();
        self.last_input = self.input.get(false);
        self.table_cursor = 0;
        self.set_status_message("Filters cleared");
    }

    fn toggle_current(&mut self) {
        let Some((column, value)) = self.panel.entry_at(self.panel_cursor) else {
            return;
        };
        let (column, value) = (column.to_string(), value.clone());
        self.engine
            .toggle(&self.dataset, &self.schema, &column, &value);
        self.clamp_table_cursor();
        let verb = if self.engine.state().is_selected(&column, &value) {
            "Selected"
        } else {
            "Cleared"
        };
        self.set_status_message(format!("{verb} {column}={value}"));
    }

    fn panel_navigation(&mut self, message: Message) {
        let last = self.panel.len().saturating_sub(1);
        match message {
            Message::MoveUp => self.panel_cursor = self.panel_cursor.saturating_sub(1),
            Message::MoveDown => self.panel_cursor = (self.panel_cursor + 1).min(last),
            Message::MovePageUp => {
                self.panel_cursor = self.panel_cursor.saturating_sub(PANEL_PAGE_SIZE)
            }
            Message::MovePageDown => {
                self.panel_cursor = (self.panel_cursor + PANEL_PAGE_SIZE).min(last)
            }
            Message::MoveBeginning => self.panel_cursor = 0,
            Message::MoveEnd => self.panel_cursor = last,
            Message::Toggle => self.toggle_current(),
            _ => (),
        }
    }

    fn table_navigation(&mut self, message: Message) {
        let last = self.engine.visible().len().saturating_sub(1);
        let page = self.table_height.max(1);
        match message {
            Message::MoveUp => self.table_cursor = self.table_cursor.saturating_sub(1),
            Message::MoveDown => self.table_cursor = (self.table_cursor + 1).min(last),
            Message::MovePageUp => self.table_cursor = self.table_cursor.saturating_sub(page),
            Message::MovePageDown => self.table_cursor = (self.table_cursor + page).min(last),
            Message::MoveBeginning => self.table_cursor = 0,
            Message::MoveEnd => self.table_cursor = last,
            _ => (),
        }
    }

    fn clamp_table_cursor(&mut self) {
        self.table_cursor = self
            .table_cursor
            .min(self.engine.visible().len().saturating_sub(1));
    }
}
