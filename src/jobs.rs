use std::fmt::Write;

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;

use crate::pipeline::Pipeline;

/// Blocks on every forked stage in pipeline order and records its exit
/// status. Stages that ran inside the shell already carry theirs.
pub fn wait_all(pipeline: &mut Pipeline) {
    for (index, stage) in pipeline.stages.iter_mut().enumerate() {
        let Some(pid) = stage.pid else {
            continue;
        };
        let code = wait_for(pid);
        tracing::debug!(stage = index, %pid, code, "reaped");
        stage.set_status(code);
    }
}

fn wait_for(pid: Pid) -> i32 {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return code,
            Ok(WaitStatus::Signaled(_, signal, _)) => return 128 + signal as i32,
            Ok(status) => {
                tracing::trace!(?status, "ignoring wait status");
                continue;
            }
            Err(Errno::EINTR) => continue,
            Err(e) => {
                tracing::error!(%pid, error = %e, "waitpid failed");
                return 1;
            }
        }
    }
}

/// `+ completed '<line>' [s0][s1]...`. Stages that never started count as 0.
pub fn summary(pipeline: &Pipeline) -> String {
    let mut out = format!("+ completed '{}' ", pipeline.line);
    for stage in &pipeline.stages {
        let _ = write!(out, "[{}]", stage.status().unwrap_or(0));
    }
    out
}
