use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::error::LaunchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Terminates the shell itself, so it never forks.
    Exit,
    /// Changes the shell's own working directory, so it never forks.
    Cd,
    Pwd,
    Sls,
    External,
}

impl Command {
    pub fn classify(name: &str) -> Self {
        match name {
            "exit" => Command::Exit,
            "cd" => Command::Cd,
            "pwd" => Command::Pwd,
            "sls" => Command::Sls,
            _ => Command::External,
        }
    }
}

pub fn cd(args: &[String]) -> Result<(), LaunchError> {
    let target = args.get(1).ok_or(LaunchError::DirAccess)?;
    env::set_current_dir(target).map_err(|e| {
        tracing::debug!(target_dir = %target, error = %e, "cd failed");
        LaunchError::DirAccess
    })
}

pub fn pwd(out: &mut impl Write) -> Result<(), LaunchError> {
    let cwd = env::current_dir().map_err(|e| {
        tracing::debug!(error = %e, "getcwd failed");
        LaunchError::DirAccess
    })?;
    let _ = writeln!(out, "{}", cwd.display());
    Ok(())
}

/// Non-hidden entries of `dir` with their sizes, sorted by name. Entries
/// that cannot be stat'ed are skipped.
pub fn list_entries(dir: &Path) -> io::Result<Vec<(String, u64)>> {
    let mut items: Vec<(String, u64)> = fs::read_dir(dir)?
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                return None;
            }
            let size = fs::metadata(entry.path()).ok()?.len();
            Some((name, size))
        })
        .collect();

    items.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(items)
}

pub fn sls(out: &mut impl Write) -> Result<(), LaunchError> {
    let items = list_entries(Path::new(".")).map_err(|_| LaunchError::DirAccess)?;
    for (name, size) in items {
        // a closed stdout is not a directory problem
        if writeln!(out, "{} ({} bytes)", name, size).is_err() {
            break;
        }
    }
    Ok(())
}
