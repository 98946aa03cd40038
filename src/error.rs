use std::io;

use thiserror::Error;

/// Rejections from the line validator. Nothing has been allocated or
/// started when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("too many process arguments")]
    TooManyArgs,
    #[error("missing command")]
    MissingCommand,
    #[error("no output file")]
    NoOutputFile,
    #[error("mislocated output redirection")]
    MislocatedRedirect,
}

/// Per-stage failures while starting a pipeline. The stage that hits one
/// ends with a failure status; its siblings keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("cannot cd into directory")]
    DirAccess,
    #[error("cannot open output file")]
    OutputFile,
    #[error("command not found")]
    CommandNotFound,
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error("system call failed: {0}")]
    Sys(#[from] nix::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Prints the fixed diagnostic line for an error.
pub fn report(err: &dyn std::error::Error) {
    eprintln!("Error: {}", err);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(ParseError::TooManyArgs.to_string(), "too many process arguments");
        assert_eq!(ParseError::MissingCommand.to_string(), "missing command");
        assert_eq!(ParseError::NoOutputFile.to_string(), "no output file");
        assert_eq!(
            ParseError::MislocatedRedirect.to_string(),
            "mislocated output redirection"
        );
        assert_eq!(LaunchError::DirAccess.to_string(), "cannot cd into directory");
        assert_eq!(LaunchError::OutputFile.to_string(), "cannot open output file");
        assert_eq!(LaunchError::CommandNotFound.to_string(), "command not found");
    }

    #[test]
    fn test_parse_error_is_transparent() {
        let err = ShellError::from(ParseError::MissingCommand);
        assert_eq!(err.to_string(), "missing command");
    }
}
