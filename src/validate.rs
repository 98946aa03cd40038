//! Single-pass syntax check run on every raw input line before anything is
//! allocated or started.

use crate::config::MAX_ARGS;
use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between pipe segments, no command yet.
    Start,
    OneArrow,
    TwoArrows,
    Args,
    ArgsSpace,
    Filename,
    /// Whitespace after the redirection symbol, filename not started.
    FilenameSpace,
}

/// Matches C `isspace`, which unlike `u8::is_ascii_whitespace` includes
/// the vertical tab.
pub fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

pub fn validate(line: &str) -> Result<(), ParseError> {
    let mut state = State::Start;
    let mut num_args = 0usize;
    let mut max_args = 0usize;

    for &c in line.as_bytes() {
        if is_space(c) {
            state = match state {
                State::Args => State::ArgsSpace,
                State::OneArrow | State::TwoArrows => State::FilenameSpace,
                other => other,
            };
            continue;
        }

        state = match (state, c) {
            (State::Start, b'|' | b'>') => return Err(ParseError::MissingCommand),
            (State::Start, _) => {
                num_args += 1;
                State::Args
            }

            (State::OneArrow, b'|') => return Err(ParseError::NoOutputFile),
            (State::OneArrow, b'>') => State::TwoArrows,
            (State::TwoArrows | State::FilenameSpace, b'|') | (State::TwoArrows, b'>') => {
                return Err(ParseError::NoOutputFile)
            }
            (State::FilenameSpace, b'>') => return Err(ParseError::MislocatedRedirect),
            (State::OneArrow | State::TwoArrows | State::FilenameSpace, _) => State::Filename,

            (State::Args | State::ArgsSpace, b'|' | b'>') => {
                max_args = max_args.max(num_args);
                num_args = 0;
                if c == b'|' {
                    State::Start
                } else {
                    State::OneArrow
                }
            }
            (State::ArgsSpace, _) => {
                num_args += 1;
                State::Args
            }
            (State::Args, _) => State::Args,

            (State::Filename, b'|' | b'>') => return Err(ParseError::MislocatedRedirect),
            (State::Filename, _) => State::Filename,
        };
    }

    max_args = max_args.max(num_args);

    match state {
        State::Start => Err(ParseError::MissingCommand),
        State::OneArrow | State::TwoArrows | State::FilenameSpace => {
            Err(ParseError::NoOutputFile)
        }
        _ if max_args > MAX_ARGS => Err(ParseError::TooManyArgs),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("a{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_accepts_valid_lines() {
        for line in [
            "ls",
            "  ls -l  ",
            "echo hi | wc -c",
            "echo hi|wc -c",
            "ls > out.txt",
            "ls>out.txt",
            "ls >> out.txt",
            "ls -l | grep src >>log",
            "cat\tfile\x0b|\x0csort",
            "ls > out.txt extra",
        ] {
            assert_eq!(validate(line), Ok(()), "line {:?}", line);
        }
    }

    #[test]
    fn test_missing_command() {
        for line in ["", "   ", "| ls", "  | ls", ">out", "  > out", "ls |", "ls | ", "ls || wc"] {
            assert_eq!(validate(line), Err(ParseError::MissingCommand), "line {:?}", line);
        }
    }

    #[test]
    fn test_no_output_file() {
        for line in ["ls >", "ls >>", "ls > ", "ls >>  \t", "ls >| wc", "ls > | wc", "ls >>> x", "ls >> | wc"] {
            assert_eq!(validate(line), Err(ParseError::NoOutputFile), "line {:?}", line);
        }
    }

    #[test]
    fn test_mislocated_redirect() {
        for line in [
            "ls > out.txt >> out2.txt",
            "ls > out.txt | wc",
            "ls >out.txt|wc",
            "ls > a > b",
            "ls > > x",
            "ls >> > x",
        ] {
            assert_eq!(validate(line), Err(ParseError::MislocatedRedirect), "line {:?}", line);
        }
    }

    #[test]
    fn test_argument_bound() {
        assert_eq!(validate(&words(MAX_ARGS)), Ok(()));
        assert_eq!(validate(&words(MAX_ARGS + 1)), Err(ParseError::TooManyArgs));
        assert_eq!(
            validate(&format!("{} > out", words(MAX_ARGS + 1))),
            Err(ParseError::TooManyArgs)
        );
    }

    #[test]
    fn test_overflow_in_any_stage() {
        let long = words(MAX_ARGS + 1);
        assert_eq!(validate(&format!("{} | wc", long)), Err(ParseError::TooManyArgs));
        assert_eq!(validate(&format!("ls | {} | wc", long)), Err(ParseError::TooManyArgs));
        assert_eq!(validate(&format!("ls | {}", long)), Err(ParseError::TooManyArgs));
    }

    #[test]
    fn test_structural_errors_win_over_overflow() {
        let long = words(MAX_ARGS + 1);
        assert_eq!(validate(&format!("{} |", long)), Err(ParseError::MissingCommand));
        assert_eq!(validate(&format!("{} >", long)), Err(ParseError::NoOutputFile));
    }
}
