use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use crate::config::OUTPUT_MODE;
use crate::error::{LaunchError, ParseError};
use crate::pipeline::words;

/// Output redirection of the last stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// `> file`
    Truncate(PathBuf),
    /// `>> file`
    Append(PathBuf),
}

impl Redirect {
    pub fn target(&self) -> &Path {
        match self {
            Redirect::Truncate(path) | Redirect::Append(path) => path,
        }
    }

    /// Opens the target for writing, creating it if absent.
    pub fn open(&self) -> Result<File, LaunchError> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).mode(OUTPUT_MODE);
        match self {
            Redirect::Truncate(_) => options.truncate(true),
            Redirect::Append(_) => options.append(true),
        };
        options.open(self.target()).map_err(|e| {
            tracing::debug!(path = %self.target().display(), error = %e, "open failed");
            LaunchError::OutputFile
        })
    }
}

/// Splits one stage segment into its argument text and optional redirection.
///
/// Only the first `>` counts; a doubled symbol selects append mode. The
/// filename is the first whitespace token after the symbols.
pub fn split_redirect(segment: &str) -> Result<(&str, Option<Redirect>), ParseError> {
    let Some(pos) = segment.find('>') else {
        return Ok((segment, None));
    };

    let (args, clause) = segment.split_at(pos);
    let append = clause[1..].starts_with('>');
    let filename = words(clause.trim_start_matches('>'))
        .next()
        .ok_or(ParseError::NoOutputFile)?;

    let path = PathBuf::from(filename);
    let redirect = if append {
        Redirect::Append(path)
    } else {
        Redirect::Truncate(path)
    };
    Ok((args, Some(redirect)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_split_without_redirect() {
        assert_eq!(split_redirect("ls -l ").unwrap(), ("ls -l ", None));
    }

    #[test]
    fn test_split_truncate_and_append() {
        let (args, redirect) = split_redirect("ls -l > out.txt ").unwrap();
        assert_eq!(args, "ls -l ");
        assert_eq!(redirect, Some(Redirect::Truncate(PathBuf::from("out.txt"))));

        let (args, redirect) = split_redirect("echo hi>>\tlog").unwrap();
        assert_eq!(args, "echo hi");
        assert_eq!(redirect, Some(Redirect::Append(PathBuf::from("log"))));
    }

    #[test]
    fn test_split_keeps_first_filename_token() {
        let (_, redirect) = split_redirect("ls > a b").unwrap();
        assert_eq!(redirect.unwrap().target(), Path::new("a"));
    }

    #[test]
    fn test_split_missing_filename() {
        assert_eq!(split_redirect("ls >  "), Err(ParseError::NoOutputFile));
    }

    #[test]
    fn test_truncate_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "old contents\n").unwrap();

        let mut file = Redirect::Truncate(path.clone()).open().unwrap();
        file.write_all(b"new\n").unwrap();
        drop(file);

        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[test]
    fn test_append_preserves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "first\n").unwrap();

        let mut file = Redirect::Append(path.clone()).open().unwrap();
        file.write_all(b"second\n").unwrap();
        drop(file);

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_creates_with_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.txt");
        Redirect::Truncate(path.clone()).open().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        // umask can only clear bits
        assert_eq!(mode & !OUTPUT_MODE, 0);
        assert!(mode & 0o600 == 0o600);
    }

    #[test]
    fn test_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        assert_eq!(
            Redirect::Truncate(path).open().unwrap_err(),
            LaunchError::OutputFile
        );
    }
}
