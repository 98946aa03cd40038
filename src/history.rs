/// Lines entered during this session, browsed with the arrow keys.
#[derive(Debug, Default)]
pub struct History {
    lines: Vec<String>,
    position: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        // Don't add duplicate of last line
        if self.lines.last().map(String::as_str) != Some(line) {
            self.lines.push(line.to_string());
        }

        self.position = self.lines.len();
    }

    pub fn previous(&mut self) -> Option<&str> {
        if self.position > 0 {
            self.position -= 1;
            self.lines.get(self.position).map(String::as_str)
        } else {
            None
        }
    }

    pub fn next(&mut self) -> Option<&str> {
        if self.position + 1 < self.lines.len() {
            self.position += 1;
            self.lines.get(self.position).map(String::as_str)
        } else {
            self.position = self.lines.len();
            None
        }
    }
}
