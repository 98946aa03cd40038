use std::env;

use crossterm::tty::IsTty;

/// Longest accepted input line, counting the terminator the line buffer
/// reserves.
pub const MAX_LINE: usize = 512;

/// Most arguments a single stage may carry, command included.
pub const MAX_ARGS: usize = 16;

/// Permission bits for files created by output redirection.
pub const OUTPUT_MODE: u32 = 0o644;

pub const DEFAULT_PROMPT: &str = "sshell@ucd$ ";

const PROMPT_ENV: &str = "SSHELL_PROMPT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Run(Config),
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prompt: String,
    /// Echo each line back to stdout after reading it.
    pub echo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            echo: !std::io::stdin().is_tty(),
        }
    }
}

impl Config {
    /// Builds the runtime configuration from argv (program name excluded)
    /// and the environment.
    pub fn from_args<I>(args: I) -> Result<Action, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        if let Ok(prompt) = env::var(PROMPT_ENV) {
            config.prompt = prompt;
        }

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(Action::Help),
                "-v" | "-V" | "--version" => return Ok(Action::Version),
                "--no-echo" => config.echo = false,
                "-p" | "--prompt" => match args.next() {
                    Some(prompt) => config.prompt = prompt,
                    None => return Err(format!("{} requires a value", arg)),
                },
                other => return Err(format!("unknown option '{}'", other)),
            }
        }

        Ok(Action::Run(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(Config::from_args(args(&["-h"])), Ok(Action::Help));
        assert_eq!(Config::from_args(args(&["--version"])), Ok(Action::Version));
    }

    #[test]
    fn test_prompt_and_echo_flags() {
        match Config::from_args(args(&["--prompt", "$ ", "--no-echo"])) {
            Ok(Action::Run(config)) => {
                assert_eq!(config.prompt, "$ ");
                assert!(!config.echo);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bad_flags() {
        assert!(Config::from_args(args(&["-p"])).is_err());
        assert!(Config::from_args(args(&["--bogus"])).is_err());
    }
}
