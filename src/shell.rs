use std::io::{self, Write};

use crossterm::tty::IsTty;

use crate::config::{Config, MAX_LINE};
use crate::editor::LineEditor;
use crate::error::{report, ShellError};
use crate::history::History;
use crate::jobs::{summary, wait_all};
use crate::launch::{launch, Flow};
use crate::pipeline::Pipeline;
use crate::pipes::{close_pipes, connect};

pub struct Shell {
    config: Config,
    history: History,
    /// Present only when stdin is a terminal.
    editor: Option<LineEditor>,
}

impl Shell {
    pub fn new(config: Config) -> Self {
        let editor = io::stdin().is_tty().then(LineEditor::new);
        Self {
            config,
            history: History::new(),
            editor,
        }
    }

    /// Reads and executes lines until end of input or `exit`.
    pub fn run(&mut self) -> Result<(), ShellError> {
        while let Some(line) = self.read_line()? {
            let line = clamp_line(&line);
            if self.editor.is_some() {
                self.history.add(line);
            }
            if self.execute(line) == Flow::Exit {
                break;
            }
        }
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        if let Some(editor) = &mut self.editor {
            return editor.read_line(&self.config.prompt, &mut self.history);
        }

        let mut stdout = io::stdout();
        write!(stdout, "{}", self.config.prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            tracing::debug!("end of input");
            return Ok(None);
        }

        if self.config.echo {
            write!(stdout, "{}", line)?;
            if !line.ends_with('\n') {
                writeln!(stdout)?;
            }
            stdout.flush()?;
        }
        Ok(Some(line))
    }

    /// Runs one input line through validation, compilation, wiring, launch
    /// and reporting. The pipeline is gone when this returns.
    pub fn execute(&mut self, line: &str) -> Flow {
        let mut pipeline = match Pipeline::parse(line) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                report(&e);
                return Flow::Continue;
            }
        };

        if let Err(e) = connect(&mut pipeline) {
            report(&e);
            return Flow::Continue;
        }

        let launched = launch(&mut pipeline);
        close_pipes(&mut pipeline);
        wait_all(&mut pipeline);

        let flow = launched.unwrap_or_else(|e| {
            report(&e);
            Flow::Continue
        });
        if flow == Flow::Exit {
            eprintln!("Bye...");
        }
        eprintln!("{}", summary(&pipeline));
        flow
    }
}

/// Drops the line terminator and cuts the line to what fits in the
/// `MAX_LINE` buffer, which reserves one byte for the terminator.
fn clamp_line(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    if line.len() < MAX_LINE {
        return line;
    }
    let mut end = MAX_LINE - 1;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}
