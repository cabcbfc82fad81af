use std::time::Duration;
use tracing::trace;

use crate::domain::{DTError, Message, TableConfig};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &TableConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, DTError> {
        if !event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(None);
        }
        let message = match event::read()? {
            Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                self.handle_key(key, model.raw_keyevents())
            }
            Event::Resize(width, height) => Some(Message::Resize(width as usize, height as usize)),
            _ => None,
        };
        Ok(message)
    }

    /// While the search box has focus every key except focus changes is
    /// forwarded untouched to the line editor.
    pub fn handle_key(&self, key: event::KeyEvent, raw: bool) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Tab, _) => Some(Message::NextFocus),
            (KeyCode::BackTab, _) => Some(Message::PreviousFocus),
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            _ if raw => Some(Message::RawKey(key)),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Char('r'), _) => Some(Message::Reset),
            (KeyCode::Esc, _) => Some(Message::Exit),
            (KeyCode::Up | KeyCode::Char('k'), _) => Some(Message::MoveUp),
            (KeyCode::Down | KeyCode::Char('j'), _) => Some(Message::MoveDown),
            (KeyCode::PageUp, _) => Some(Message::MovePageUp),
            (KeyCode::PageDown, _) => Some(Message::MovePageDown),
            (KeyCode::Home | KeyCode::Char('g'), _) => Some(Message::MoveBeginning),
            (KeyCode::End | KeyCode::Char('G'), _) => Some(Message::MoveEnd),
            (KeyCode::Char(' ') | KeyCode::Enter, _) => Some(Message::Toggle),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn navigation_keys() {
        let controller = Controller::new(&TableConfig::default());
        assert_eq!(controller.handle_key(key(KeyCode::Char('q')), false), Some(Message::Quit));
        assert_eq!(controller.handle_key(key(KeyCode::Char('j')), false), Some(Message::MoveDown));
        assert_eq!(controller.handle_key(key(KeyCode::Char(' ')), false), Some(Message::Toggle));
        assert_eq!(controller.handle_key(key(KeyCode::Tab), false), Some(Message::NextFocus));
        assert_eq!(controller.handle_key(key(KeyCode::Char('x')), false), None);
    }

    #[test]
    fn raw_mode_forwards_keys() {
        let controller = Controller::new(&TableConfig::default());
        let q = key(KeyCode::Char('q'));
        assert_eq!(controller.handle_key(q, true), Some(Message::RawKey(q)));
        assert_eq!(controller.handle_key(key(KeyCode::BackTab), true), Some(Message::PreviousFocus));
        assert_eq!(
            controller.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), true),
            Some(Message::Quit)
        );
    }
}
