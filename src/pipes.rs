use nix::unistd::pipe;

use crate::error::ShellError;
use crate::pipeline::Pipeline;

/// Wires each adjacent pair of stages with a fresh pipe: stage `i` writes
/// into it and stage `i + 1` reads from it. Returns the number of pipes
/// created.
///
/// Nothing is closed here. Every forked stage must inherit the whole set
/// before trimming it with [`close_pipes`].
pub fn connect(pipeline: &mut Pipeline) -> Result<usize, ShellError> {
    let mut created = 0;
    for i in 1..pipeline.stages.len() {
        let (read, write) = pipe()?;
        tracing::trace!(
            from = i - 1,
            to = i,
            ?read,
            ?write,
            "created pipe"
        );
        pipeline.stages[i - 1].output = Some(write);
        pipeline.stages[i].input = Some(read);
        created += 1;
    }
    Ok(created)
}

/// Drops every pipe end still held by any stage, closing it in the
/// calling process. Returns how many descriptors were closed.
pub fn close_pipes(pipeline: &mut Pipeline) -> usize {
    let mut closed = 0;
    for stage in &mut pipeline.stages {
        closed += usize::from(stage.input.take().is_some());
        closed += usize::from(stage.output.take().is_some());
    }
    closed
}
