use std::os::fd::OwnedFd;

use nix::unistd::Pid;

use crate::error::ParseError;
use crate::redirects::{split_redirect, Redirect};
use crate::validate::{is_space, validate};

/// One `|`-separated segment of an input line.
#[derive(Debug)]
pub struct Stage {
    /// `args[0]` is the command name.
    pub args: Vec<String>,
    pub redirect: Option<Redirect>,
    /// Read end of the previous stage's pipe; `None` is standard input.
    pub input: Option<OwnedFd>,
    /// Write end of this stage's pipe; `None` is standard output.
    pub output: Option<OwnedFd>,
    pub pid: Option<Pid>,
    status: Option<i32>,
}

impl Stage {
    fn new(args: Vec<String>, redirect: Option<Redirect>) -> Self {
        Self {
            args,
            redirect,
            input: None,
            output: None,
            pid: None,
            status: None,
        }
    }

    pub fn command(&self) -> &str {
        &self.args[0]
    }

    pub fn status(&self) -> Option<i32> {
        self.status
    }

    pub fn set_status(&mut self, code: i32) {
        debug_assert!(self.status.is_none(), "stage status set twice");
        if self.status.is_none() {
            self.status = Some(code);
        }
    }
}

/// A compiled input line: the stages in left-to-right order plus the text
/// they came from.
#[derive(Debug)]
pub struct Pipeline {
    pub line: String,
    pub stages: Vec<Stage>,
}

impl Pipeline {
    /// Validates `line` and compiles it into stages. Descriptors are left
    /// unassigned; see [`crate::pipes::connect`].
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        validate(line)?;

        let stages = line
            .split('|')
            .map(compile_stage)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(stages = stages.len(), "compiled pipeline");
        Ok(Self {
            line: line.to_string(),
            stages,
        })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }
}

fn compile_stage(segment: &str) -> Result<Stage, ParseError> {
    let (text, redirect) = split_redirect(segment)?;
    let args: Vec<String> = words(text).map(str::to_string).collect();
    if args.is_empty() {
        return Err(ParseError::MissingCommand);
    }
    Ok(Stage::new(args, redirect))
}

/// Whitespace-separated tokens of `text`.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_ascii() && is_space(c as u8))
        .filter(|tok| !tok.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_single_stage() {
        let pipeline = Pipeline::parse("  ls   -l\t/tmp ").unwrap();
        assert_eq!(pipeline.len(), 1);
        let stage = &pipeline.stages[0];
        assert_eq!(stage.command(), "ls");
        assert_eq!(stage.args, vec!["ls", "-l", "/tmp"]);
        assert_eq!(stage.redirect, None);
        assert!(stage.input.is_none() && stage.output.is_none());
        assert_eq!(stage.status(), None);
    }

    #[test]
    fn test_stage_order_and_redirect() {
        let pipeline = Pipeline::parse("cat a b | sort -r | uniq >> counts.txt").unwrap();
        let commands: Vec<&str> = pipeline.stages.iter().map(Stage::command).collect();
        assert_eq!(commands, vec!["cat", "sort", "uniq"]);
        assert_eq!(pipeline.stages[0].args, vec!["cat", "a", "b"]);
        assert_eq!(pipeline.stages[1].redirect, None);
        assert_eq!(
            pipeline.stages[2].redirect,
            Some(Redirect::Append(PathBuf::from("counts.txt")))
        );
        assert_eq!(pipeline.stages[2].args, vec!["uniq"]);
    }

    #[test]
    fn test_keeps_original_line() {
        let pipeline = Pipeline::parse("echo hi | wc -c").unwrap();
        assert_eq!(pipeline.line, "echo hi | wc -c");
    }

    #[test]
    fn test_rejects_before_compiling() {
        assert_eq!(
            Pipeline::parse("ls > out.txt >> out2.txt").unwrap_err(),
            ParseError::MislocatedRedirect
        );
        assert_eq!(Pipeline::parse("| ls").unwrap_err(), ParseError::MissingCommand);
    }

    #[test]
    fn test_status_set_once() {
        let mut pipeline = Pipeline::parse("true").unwrap();
        pipeline.stages[0].set_status(3);
        assert_eq!(pipeline.stages[0].status(), Some(3));
    }

    #[test]
    fn test_words() {
        let toks: Vec<&str> = words(" a\tb\x0b c\r\n").collect();
        assert_eq!(toks, vec!["a", "b", "c"]);
    }
}
