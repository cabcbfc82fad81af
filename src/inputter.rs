use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::trace;

/// Single line editor behind the search box. Text is kept lowercase and the
/// cursor counts characters, not bytes.
#[derive(Debug, Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub curser_pos: usize,
    pub changed: bool,
    pub finished: bool,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        let before = self.current_input.len();
        let result = match (key.code, key.modifiers) {
            (KeyCode::Enter, _) | (KeyCode::Esc, _) => self.finish(),
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.move_to(self.curser_pos.saturating_sub(1)),
            (KeyCode::Right, _) => self.move_to(self.curser_pos + 1),
            (KeyCode::Home, _) => self.move_to(0),
            (KeyCode::End, _) => self.move_to(usize::MAX),
            (KeyCode::Char(chr), KeyModifiers::NONE | KeyModifiers::SHIFT) => self.insert(chr),
            _ => self.get(false),
        };
        trace!(
            "Input {:?} -> {:?} ({} -> {} bytes)",
            key.code,
            result.input,
            before,
            result.input.len()
        );
        result
    }

    pub fn get(&self, changed: bool) -> InputResult {
        InputResult {
            input: self.current_input.clone(),
            curser_pos: self.curser_pos,
            changed,
            finished: false,
        }
    }

    pub fn clear(&mut self) {
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn finish(&mut self) -> InputResult {
        InputResult {
            finished: true,
            ..self.get(false)
        }
    }

    /// Searches match lowercased text, so the box holds it lowercased too.
    fn insert(&mut self, chr: char) -> InputResult {
        for lower in chr.to_lowercase() {
            let pos = self.byte_pos(self.curser_pos);
            self.current_input.insert(pos, lower);
            self.curser_pos += 1;
        }
        self.get(true)
    }

    fn backspace(&mut self) -> InputResult {
        if self.curser_pos == 0 {
            return self.get(false);
        }
        self.curser_pos -= 1;
        let pos = self.byte_pos(self.curser_pos);
        self.current_input.remove(pos);
        self.get(true)
    }

    fn delete(&mut self) -> InputResult {
        if self.curser_pos >= self.char_count() {
            return self.get(false);
        }
        let pos = self.byte_pos(self.curser_pos);
        self.current_input.remove(pos);
        self.get(true)
    }

    fn move_to(&mut self, pos: usize) -> InputResult {
        self.curser_pos = pos.min(self.char_count());
        self.get(false)
    }

    fn char_count(&self) -> usize {
        self.current_input.chars().count()
    }

    fn byte_pos(&self, char_pos: usize) -> usize {
        self.current_input
            .char_indices()
            .nth(char_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}
