use std::ffi::CString;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::process;

use nix::errno::Errno;
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::unistd::{execvp, fork, ForkResult, Pid};

use crate::command::{self, Command};
use crate::error::{report, LaunchError, ShellError};
use crate::pipeline::{Pipeline, Stage};
use crate::pipes::close_pipes;

/// What the shell loop should do once the pipeline has been reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Starts every stage of a connected pipeline, left to right.
///
/// `exit` and `cd` run right here; everything else is forked and the
/// child's pid is recorded on its stage. No pipe end is closed in the
/// controlling process until all stages are started, so the caller must
/// follow up with [`close_pipes`] and then wait on the stages.
pub fn launch(pipeline: &mut Pipeline) -> Result<Flow, ShellError> {
    for index in 0..pipeline.len() {
        match Command::classify(pipeline.stages[index].command()) {
            Command::Exit => {
                tracing::debug!(stage = index, "exit requested");
                pipeline.stages[index].set_status(0);
                return Ok(Flow::Exit);
            }
            Command::Cd => {
                let stage = &mut pipeline.stages[index];
                let code = match command::cd(&stage.args) {
                    Ok(()) => 0,
                    Err(e) => {
                        report(&e);
                        1
                    }
                };
                stage.set_status(code);
            }
            Command::Pwd | Command::Sls | Command::External => {
                let pid = spawn_stage(pipeline, index)?;
                pipeline.stages[index].pid = Some(pid);
            }
        }
    }
    Ok(Flow::Continue)
}

/// Forks the process for stage `index` and returns its pid. Only the
/// parent returns.
pub fn spawn_stage(pipeline: &mut Pipeline, index: usize) -> Result<Pid, ShellError> {
    // the child would otherwise write out our pending output a second time
    io::stdout().flush()?;

    // SAFETY: the shell is single-threaded, so the child gets a consistent
    // copy of every lock and allocator state.
    let forked = unsafe { fork() }?;
    match forked {
        ForkResult::Parent { child } => {
            tracing::debug!(stage = index, pid = %child, command = pipeline.stages[index].command(), "forked");
            Ok(child)
        }
        ForkResult::Child => run_child(pipeline, index),
    }
}

fn run_child(pipeline: &mut Pipeline, index: usize) -> ! {
    let prepared = reset_signals()
        .map_err(ShellError::from)
        .and_then(|()| bind_stdio(pipeline, index));
    let code = match prepared {
        Ok(()) => run_program(&pipeline.stages[index]),
        Err(e) => {
            report(&e);
            1
        }
    };
    let _ = io::stdout().flush();
    process::exit(code)
}

/// The runtime starts with SIGPIPE ignored and `execvp` keeps ignored
/// dispositions, so a writer whose reader has exited would see EPIPE
/// instead of dying.
fn reset_signals() -> nix::Result<()> {
    // SAFETY: SIG_DFL installs no handler code.
    unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) }.map(drop)
}

/// Installs the stage's descriptors as stdin/stdout, then drops every pipe
/// end of the pipeline.
fn bind_stdio(pipeline: &mut Pipeline, index: usize) -> Result<(), ShellError> {
    let stage = &pipeline.stages[index];

    if let Some(input) = &stage.input {
        dup_onto(input, libc::STDIN_FILENO)?;
    }

    match &stage.redirect {
        Some(redirect) => {
            let file = redirect.open()?;
            dup_onto(&file, libc::STDOUT_FILENO)?;
        }
        None => {
            if let Some(output) = &stage.output {
                dup_onto(output, libc::STDOUT_FILENO)?;
            }
        }
    }

    close_pipes(pipeline);
    Ok(())
}

fn dup_onto(fd: &impl AsRawFd, target: RawFd) -> nix::Result<()> {
    // SAFETY: `fd` is borrowed and open for the duration of the call, and
    // `target` is one of the standard streams this process already owns.
    let res = unsafe { libc::dup2(fd.as_raw_fd(), target) };
    Errno::result(res).map(drop)
}

/// Runs the stage inside the forked child. Returns the exit code when the
/// program image was not replaced.
fn run_program(stage: &Stage) -> i32 {
    let mut stdout = io::stdout();
    let result = match Command::classify(stage.command()) {
        Command::Pwd => command::pwd(&mut stdout),
        Command::Sls => command::sls(&mut stdout),
        _ => Err(exec(&stage.args)),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            report(&e);
            1
        }
    }
}

/// Replaces the process image. Only returns on failure.
fn exec(args: &[String]) -> LaunchError {
    let argv: Result<Vec<CString>, _> = args.iter().map(|a| CString::new(a.as_bytes())).collect();
    let Ok(argv) = argv else {
        return LaunchError::CommandNotFound;
    };

    match execvp(&argv[0], &argv) {
        Ok(never) => match never {},
        Err(errno) => {
            tracing::debug!(command = %args[0], %errno, "exec failed");
            LaunchError::CommandNotFound
        }
    }
}
