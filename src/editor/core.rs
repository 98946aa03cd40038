use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, ClearType},
};

use crate::history::History;

/// Raw mode for as long as this value lives. Dropping it, including while
/// unwinding, puts the terminal back in cooked mode.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::warn!(error = %e, "could not leave raw mode");
        }
    }
}

/// Text being edited plus a cursor counted in chars.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct LineBuffer {
    text: String,
    cursor: usize,
}

impl LineBuffer {
    fn byte_index(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
        true
    }

    fn delete(&mut self) -> bool {
        if self.cursor >= self.char_len() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
        true
    }

    fn left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    fn right(&mut self) -> bool {
        if self.cursor >= self.char_len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    fn home(&mut self) {
        self.cursor = 0;
    }

    fn end(&mut self) {
        self.cursor = self.char_len();
    }

    fn kill_to_end(&mut self) {
        let at = self.byte_index(self.cursor);
        self.text.truncate(at);
    }

    fn kill_to_start(&mut self) {
        let at = self.byte_index(self.cursor);
        self.text.drain(..at);
        self.cursor = 0;
    }

    /// Ctrl+W: the word before the cursor plus the whitespace after it.
    fn delete_word(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut start = self.cursor;
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        let (from, to) = (self.byte_index(start), self.byte_index(self.cursor));
        self.text.drain(from..to);
        self.cursor = start;
    }

    fn replace(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.char_len();
    }

    fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// Minimal raw-mode line editor used when stdin is a terminal.
#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: LineBuffer,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads one line. `None` means end of input (Ctrl+D on an empty line).
    pub fn read_line(&mut self, prompt: &str, history: &mut History) -> io::Result<Option<String>> {
        self.buffer.clear();

        let mut stdout = io::stdout();
        let _raw = RawMode::enable()?;

        execute!(stdout, Print(prompt))?;
        stdout.flush()?;

        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }

            match key {
                KeyEvent { code: KeyCode::Enter, .. } => {
                    execute!(stdout, Print("\r\n"))?;
                    return Ok(Some(self.buffer.text.clone()));
                }
                KeyEvent {
                    code: KeyCode::Char('c'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => {
                    self.buffer.clear();
                    execute!(stdout, Print("^C\r\n"), Print(prompt))?;
                    stdout.flush()?;
                }
                KeyEvent {
                    code: KeyCode::Char('d'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => {
                    if self.buffer.text.is_empty() {
                        execute!(stdout, Print("\r\n"))?;
                        return Ok(None);
                    }
                }
                KeyEvent { code: KeyCode::Backspace, .. } => {
                    if self.buffer.backspace() {
                        self.redraw(prompt)?;
                    }
                }
                KeyEvent { code: KeyCode::Delete, .. } => {
                    if self.buffer.delete() {
                        self.redraw(prompt)?;
                    }
                }
                KeyEvent { code: KeyCode::Left, .. } => {
                    if self.buffer.left() {
                        self.move_cursor(prompt)?;
                    }
                }
                KeyEvent { code: KeyCode::Right, .. } => {
                    if self.buffer.right() {
                        self.move_cursor(prompt)?;
                    }
                }
                KeyEvent { code: KeyCode::Up, .. } => {
                    if let Some(entry) = history.previous() {
                        self.buffer.replace(entry);
                        self.redraw(prompt)?;
                    }
                }
                KeyEvent { code: KeyCode::Down, .. } => {
                    match history.next() {
                        Some(entry) => self.buffer.replace(entry),
                        None => self.buffer.clear(),
                    }
                    self.redraw(prompt)?;
                }
                KeyEvent { code: KeyCode::Home, .. }
                | KeyEvent {
                    code: KeyCode::Char('a'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => {
                    self.buffer.home();
                    self.move_cursor(prompt)?;
                }
                KeyEvent { code: KeyCode::End, .. }
                | KeyEvent {
                    code: KeyCode::Char('e'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => {
                    self.buffer.end();
                    self.move_cursor(prompt)?;
                }
                KeyEvent {
                    code: KeyCode::Char('k'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => {
                    self.buffer.kill_to_end();
                    self.redraw(prompt)?;
                }
                KeyEvent {
                    code: KeyCode::Char('u'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => {
                    self.buffer.kill_to_start();
                    self.redraw(prompt)?;
                }
                KeyEvent {
                    code: KeyCode::Char('w'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => {
                    self.buffer.delete_word();
                    self.redraw(prompt)?;
                }
                KeyEvent {
                    code: KeyCode::Char('l'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => {
                    execute!(stdout, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))?;
                    self.redraw(prompt)?;
                }
                KeyEvent {
                    code: KeyCode::Char(c),
                    modifiers: KeyModifiers::NONE | KeyModifiers::SHIFT,
                    ..
                } => {
                    self.buffer.insert(c);
                    self.redraw(prompt)?;
                }
                _ => {}
            }
        }
    }

    fn redraw(&self, prompt: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::UntilNewLine),
            Print(prompt),
            Print(&self.buffer.text),
        )?;
        self.move_cursor(prompt)
    }

    fn move_cursor(&self, prompt: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        let column = prompt.chars().count() + self.buffer.cursor;
        execute!(stdout, cursor::MoveToColumn(column as u16))?;
        stdout.flush()
    }
}
