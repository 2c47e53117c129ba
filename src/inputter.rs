use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::trace;

/// Single line editor for the command line. The cursor counts chars, not bytes.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize,
    finished: bool,
    canceled: bool,
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub curser_pos: usize,
    /// The text differs from before this key.
    pub changed: bool,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        let before = self.current_input.clone();
        let mut result = match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.enter(),
            (KeyCode::Esc, _) => self.escape(),
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.left(),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => self.home(),
            (KeyCode::End, _) => self.end(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => self.kill_line(),
            (kc, km) => self.key(kc, km),
        };
        result.changed = result.input != before;
        trace!("Input {:?} -> {:?}", key.code, result);
        result
    }

    /// Preset the text (e.g. the current query) with the cursor at its end.
    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.curser_pos = s.chars().count();
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            canceled: self.canceled,
            finished: self.finished,
            input: self.current_input.clone(),
            curser_pos: self.curser_pos,
            changed: false,
        }
    }

    pub fn clear(&mut self) {
        self.canceled = false;
        self.finished = false;
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn enter(&mut self) -> InputResult {
        self.finished = true;
        self.get()
    }

    fn escape(&mut self) -> InputResult {
        self.canceled = true;
        self.finished = true;
        self.get()
    }

    fn backspace(&mut self) -> InputResult {
        if self.curser_pos > 0 {
            self.curser_pos -= 1;
            let at = self.getbytepos();
            self.current_input.remove(at);
        }
        self.get()
    }

    fn delete(&mut self) -> InputResult {
        if self.curser_pos < self.current_input.chars().count() {
            let at = self.getbytepos();
            self.current_input.remove(at);
        }
        self.get()
    }

    fn left(&mut self) -> InputResult {
        self.curser_pos = self.curser_pos.saturating_sub(1);
        self.get()
    }

    fn right(&mut self) -> InputResult {
        if self.curser_pos < self.current_input.chars().count() {
            self.curser_pos += 1;
        }
        self.get()
    }

    fn home(&mut self) -> InputResult {
        self.curser_pos = 0;
        self.get()
    }

    fn end(&mut self) -> InputResult {
        self.curser_pos = self.current_input.chars().count();
        self.get()
    }

    fn kill_line(&mut self) -> InputResult {
        self.current_input.clear();
        self.curser_pos = 0;
        self.get()
    }

    fn key(&mut self, code: KeyCode, modifier: KeyModifiers) -> InputResult {
        if let Some(chr) = code.as_char()
            && !modifier.contains(KeyModifiers::CONTROL)
        {
            let at = self.getbytepos();
            self.current_input.insert(at, chr);
            self.curser_pos += 1;
        }
        self.get()
    }

    fn getbytepos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.curser_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn press(inputter: &mut Inputter, code: KeyCode) -> InputResult {
        inputter.read(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(inputter: &mut Inputter, s: &str) -> InputResult {
        let mut last = inputter.get();
        for c in s.chars() {
            last = press(inputter, KeyCode::Char(c));
        }
        last
    }

    #[test]
    fn edits_at_the_cursor() {
        let mut inputter = Inputter::default();
        type_str(&mut inputter, "blndr");
        press(&mut inputter, KeyCode::Left);
        let r = press(&mut inputter, KeyCode::Char('e'));
        assert_eq!(r.input, "blnder");
        assert!(r.changed);

        press(&mut inputter, KeyCode::Home);
        press(&mut inputter, KeyCode::Right);
        press(&mut inputter, KeyCode::Right);
        let r = press(&mut inputter, KeyCode::Char('e'));
        assert_eq!(r.input, "blender");
        assert_eq!(r.curser_pos, 3);
    }

    #[test]
    fn backspace_and_delete_handle_multibyte() {
        let mut inputter = Inputter::default();
        inputter.set("café");
        let r = press(&mut inputter, KeyCode::Backspace);
        assert_eq!(r.input, "caf");
        press(&mut inputter, KeyCode::Home);
        let r = press(&mut inputter, KeyCode::Delete);
        assert_eq!(r.input, "af");
    }

    #[test]
    fn cursor_moves_do_not_change_text() {
        let mut inputter = Inputter::default();
        inputter.set("abc");
        let r = press(&mut inputter, KeyCode::Left);
        assert!(!r.changed);
        assert_eq!(r.curser_pos, 2);
    }

    #[test]
    fn enter_finishes_escape_cancels() {
        let mut inputter = Inputter::default();
        type_str(&mut inputter, "42");
        let r = press(&mut inputter, KeyCode::Enter);
        assert!(r.finished && !r.canceled);
        assert_eq!(r.input, "42");

        inputter.clear();
        let r = press(&mut inputter, KeyCode::Esc);
        assert!(r.finished && r.canceled);
    }
}
