use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState},
};

use crate::domain::{Focus, TableConfig};
use crate::filter::SearchMode;
use crate::model::{Model, UIData};
use crate::view::CheckboxGroup;

pub const STATUSLINE_HEIGHT: u16 = 1;
pub const SEARCH_BOX_HEIGHT: u16 = 3;
/// Rows of the screen not available to table records: status line, search
/// box, table border and header.
pub const TABLE_CHROME_HEIGHT: usize = (STATUSLINE_HEIGHT + SEARCH_BOX_HEIGHT + 2 + 1) as usize;
pub const COLUMN_WIDTH_MARGIN: usize = 1;

const CHECKED: &str = "[x] ";
const UNCHECKED: &str = "[ ] ";

#[derive(Debug)]
pub struct TableUI {
    max_column_width: usize,
    panel_width: u16,
}

impl TableUI {
    pub fn new(config: &TableConfig) -> Self {
        Self {
            max_column_width: config.max_column_width,
            panel_width: config.panel_width as u16,
        }
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();

        let [main_area, status_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(STATUSLINE_HEIGHT)])
                .areas(frame.area());
        let [panel_area, right_area] =
            Layout::horizontal([Constraint::Length(self.panel_width), Constraint::Min(0)])
                .areas(main_area);
        let [search_area, table_area] =
            Layout::vertical([Constraint::Length(SEARCH_BOX_HEIGHT), Constraint::Min(0)])
                .areas(right_area);

        self.render_panel(&uidata, frame, panel_area);
        self.render_search(&uidata, frame, search_area);
        self.render_table(&uidata, frame, table_area);
        self.render_statusline(&uidata, frame, status_area);

        if uidata.show_popup {
            self.render_popup(&uidata, frame);
        }
    }

    fn focus_block(title: String, focused: bool) -> Block<'static> {
        let block = Block::bordered().title(title.bold());
        if focused {
            block.border_style(Style::default().fg(Color::Yellow))
        } else {
            block
        }
    }

    fn render_panel(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let (items, selected) = Self::panel_items(&uidata.groups, uidata.panel_cursor);
        let focused = uidata.focus == Focus::Panel;
        let list = List::new(items)
            .block(Self::focus_block(" Filters ".to_string(), focused))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default().with_selected(if focused { selected } else { None });
        frame.render_stateful_widget(list, area, &mut state);
    }

    /// Flattens the groups into list lines and maps the entry cursor to its
    /// line, skipping the group titles.
    fn panel_items(groups: &[CheckboxGroup], cursor: usize) -> (Vec<ListItem<'static>>, Option<usize>) {
        let mut items = Vec::new();
        let mut selected = None;
        let mut entry_idx = 0;
        for group in groups {
            items.push(ListItem::new(Line::from(group.title.clone().bold().cyan())));
            for entry in &group.entries {
                if entry_idx == cursor {
                    selected = Some(items.len());
                }
                let mark = if entry.checked { CHECKED } else { UNCHECKED };
                items.push(ListItem::new(format!("{mark}{}", entry.value)));
                entry_idx += 1;
            }
        }
        (items, selected)
    }

    fn render_search(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let focused = uidata.focus == Focus::Search;
        let block = Self::focus_block(format!(" {} ", uidata.search_label), focused);
        let (scroll, column) = Self::search_viewport(
            &uidata.cmdinput.input,
            uidata.cmdinput.curser_pos,
            area.width.saturating_sub(2),
        );
        let paragraph = Paragraph::new(uidata.cmdinput.input.clone())
            .block(block)
            .scroll((0, scroll));
        frame.render_widget(paragraph, area);

        if focused && !uidata.show_popup {
            frame.set_cursor_position((area.x + 1 + column, area.y + 1));
        }
    }

    /// Horizontal scroll of the search text and the cursor column inside the
    /// box, both in display cells so wide characters count twice.
    fn search_viewport(input: &str, curser_pos: usize, inner_width: u16) -> (u16, u16) {
        let before: String = input.chars().take(curser_pos).collect();
        let cursor = Span::raw(before).width() as u16;
        let scroll = cursor.saturating_sub(inner_width.saturating_sub(1));
        (scroll, cursor - scroll)
    }

    fn column_widths(&self, uidata: &UIData) -> Vec<Constraint> {
        uidata
            .header
            .iter()
            .enumerate()
            .map(|(cidx, name)| {
                let widest = uidata
                    .rows
                    .iter()
                    .map(|row| row[cidx].chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(name.chars().count());
                let width = (widest + COLUMN_WIDTH_MARGIN).min(self.max_column_width);
                Constraint::Length(width as u16)
            })
            .collect()
    }

    fn render_table(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let focused = uidata.focus == Focus::Table;
        let header = Row::new(uidata.header.iter().map(|h| Cell::from(h.clone())))
            .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));
        let rows = uidata
            .rows
            .iter()
            .map(|row| Row::new(row.iter().map(|c| Cell::from(c.clone()))));

        let table = Table::new(rows, self.column_widths(uidata))
            .header(header)
            .block(Self::focus_block(" Dynamic Table ".to_string(), focused))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let selected = (focused && !uidata.rows.is_empty()).then_some(uidata.table_cursor);
        let mut state = TableState::default().with_selected(selected);
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let mode = match uidata.search_mode {
            SearchMode::Legacy => "legacy",
            SearchMode::Recompute => "recompute",
        };
        let line = Line::from(vec![
            format!(" {}/{} rows ", uidata.rows.len(), uidata.nrows).bold(),
            format!("│ search: {mode} │ ").into(),
            uidata.status_message.clone().yellow(),
            " │ ".into(),
            "?".blue().bold(),
            " help ".into(),
            "q".blue().bold(),
            " quit".into(),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_popup(&self, uidata: &UIData, frame: &mut Frame) {
        let area = frame.area();
        let height = (uidata.popup_message.lines().count() as u16 + 2).min(area.height);
        let width = (uidata
            .popup_message
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0) as u16
            + 4)
        .min(area.width);
        let popup = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(uidata.popup_message.clone())
                .block(Block::bordered().title(" Help ".bold())),
            popup,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Message;
    use crate::record::Dataset;
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend};

    const DATA: &str = r#"[
        {"id": 1, "name": "alpha", "kind": "xray"},
        {"id": 2, "name": "bravo", "kind": "yankee"},
        {"id": 3, "name": "charlie", "kind": "xray", "note": "late"}
    ]"#;

    fn render(model: &Model) -> String {
        let config = TableConfig::default();
        let ui = TableUI::new(&config);
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| ui.draw(model, f)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|line| line.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn model() -> Model {
        Model::init(&TableConfig::default(), Dataset::from_json_str(DATA).unwrap(), 24)
    }

    #[test]
    fn renders_panel_search_and_table() {
        let screen = render(&model());
        assert!(screen.contains("KIND"));
        assert!(screen.contains("NOTE"));
        assert!(screen.contains("[ ] xray"));
        assert!(screen.contains("[ ] yankee"));
        assert!(screen.contains(" NAME "));
        assert!(screen.contains("kind"));
        assert!(screen.contains("charlie"));
        assert!(screen.contains("3/3 rows"));
        assert!(!screen.contains("[ ] alpha"));
    }

    #[test]
    fn hides_filtered_rows() {
        let mut model = model();
        model.update(Message::MoveDown);
        model.update(Message::Toggle);
        let screen = render(&model);
        assert!(screen.contains("[x] yankee"));
        assert!(screen.contains("bravo"));
        assert!(!screen.contains("alpha"));
        assert!(!screen.contains("charlie"));
        assert!(screen.contains("1/3 rows"));
    }

    #[test]
    fn shows_help_popup() {
        let mut model = model();
        model.update(Message::Help);
        let screen = render(&model);
        assert!(screen.contains("Help"));
        assert!(screen.contains("Reset all filters"));
    }

    #[test]
    fn panel_cursor_skips_titles() {
        let groups = model().get_uidata().groups;
        let (items, selected) = TableUI::panel_items(&groups, 2);
        // KIND, xray, yankee, NOTE, late
        assert_eq!(items.len(), 5);
        assert_eq!(selected, Some(4));
    }

    #[test]
    fn search_cursor_counts_display_cells() {
        assert_eq!(TableUI::search_viewport("abc", 3, 20), (0, 3));
        assert_eq!(TableUI::search_viewport("日本語", 2, 20), (0, 4));
        assert_eq!(TableUI::search_viewport("日本語", 3, 4), (3, 3));
        assert_eq!(TableUI::search_viewport("abcdefghij", 10, 5), (6, 4));
        assert_eq!(TableUI::search_viewport("abcdefghij", 0, 5), (0, 0));
    }

    #[test]
    fn long_query_scrolls_to_the_cursor() {
        let mut model = model();
        model.update(Message::NextFocus);
        for _ in 0..80 {
            model.update(Message::RawKey(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE)));
        }
        let config = TableConfig::default();
        let ui = TableUI::new(&config);
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| ui.draw(&model, f)).unwrap();
        // search box spans columns 28..100, its inner area ends at column 98
        terminal.backend_mut().assert_cursor_position((98, 1));
    }

    #[test]
    fn empty_dataset_renders() {
        let model = Model::init(&TableConfig::default(), Dataset::default(), 24);
        let screen = render(&model);
        assert!(screen.contains("SEARCH"));
        assert!(screen.contains("0/0 rows"));
    }
}
