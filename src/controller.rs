use std::time::Duration;
use tracing::trace;

use crate::domain::{CatConfig, CatError, Message};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &CatConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    /// Wait up to the poll time for input. `Ok(None)` lets the model paint
    /// the next batch.
    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, CatError> {
        // keep painting while batches are pending
        let timeout = if model.is_rendering() {
            Duration::ZERO
        } else {
            Duration::from_millis(self.event_poll_time)
        };
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let message = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if model.raw_keyevents() {
                    Some(Message::RawKey(key))
                } else {
                    map_key(key)
                }
            }
            Event::Resize(width, height) => Some(Message::Resize(width as usize, height as usize)),
            _ => None,
        };
        Ok(message)
    }
}

fn map_key(key: KeyEvent) -> Option<Message> {
    let message = match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
        (KeyCode::Char('q'), _) => Some(Message::Quit),
        (KeyCode::Down | KeyCode::Char('j'), _) => Some(Message::MoveDown),
        (KeyCode::Up | KeyCode::Char('k'), _) => Some(Message::MoveUp),
        (KeyCode::Left | KeyCode::Char('h'), _) => Some(Message::MoveLeft),
        (KeyCode::Right, _) => Some(Message::MoveRight),
        (KeyCode::PageDown, _) => Some(Message::MovePageDown),
        (KeyCode::PageUp, _) => Some(Message::MovePageUp),
        (KeyCode::Home | KeyCode::Char('g'), _) => Some(Message::MoveBeginning),
        (KeyCode::End | KeyCode::Char('G'), _) => Some(Message::MoveEnd),
        (KeyCode::Char('/'), _) => Some(Message::Search),
        (KeyCode::Char('v'), _) => Some(Message::MinViews),
        (KeyCode::Char('m'), _) => Some(Message::MinSecondary),
        (KeyCode::Char('c'), _) => Some(Message::CycleCategory),
        (KeyCode::Char('s') | KeyCode::Enter, _) => Some(Message::SortSelected),
        (KeyCode::Char('t'), _) => Some(Message::ToggleThumbs),
        (KeyCode::Char('l'), _) => Some(Message::ToggleLayout),
        (KeyCode::Char('d'), _) => Some(Message::ToggleTheme),
        (KeyCode::Char('?'), _) => Some(Message::Help),
        (KeyCode::Esc, _) => Some(Message::Exit),
        _ => None,
    };
    trace!("Mapped: {key:?} => {message:?}");
    message
}
