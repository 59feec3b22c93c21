//! Child-process execution for one configured command.
//!
//! Execution rules:
//! - stdout and stderr share ONE pipe, so the captured output keeps the
//!   interleaving the child produced.
//! - The child inherits environment and working directory; stdin is null.
//! - No timeout: the call blocks until the pipe reaches EOF and the child
//!   exits.
//! - Never returns an error. Every failure is folded into `ExecOutcome`.

use std::io::{self, Read};
use std::process::{Command, ExitStatus, Stdio};

use crate::cmdline::{self, CommandLine};

/// Gauge value for a command that could not be executed at all.
pub const UNEXECUTABLE: i32 = -1;

/// Result of running one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutcome {
    /// 0 on success, the exit code on failure, `UNEXECUTABLE` otherwise.
    pub value: i32,
    /// Combined stdout+stderr, one trailing newline removed.
    pub output: String,
    /// Empty unless the command could not be executed.
    pub error: String,
}

impl ExecOutcome {
    fn unexecutable(output: String, error: impl ToString) -> Self {
        Self {
            value: UNEXECUTABLE,
            output,
            error: error.to_string(),
        }
    }

    pub fn gauge_value(&self) -> f64 {
        f64::from(self.value)
    }

    pub fn is_success(&self) -> bool {
        self.value == 0 && self.error.is_empty()
    }
}

/// Remove exactly one trailing `\n`, if present.
pub fn trim_trailing_newline(s: &str) -> &str {
    s.strip_suffix('\n').unwrap_or(s)
}

/// Tokenize `line` and execute it.
pub fn run(line: &str) -> ExecOutcome {
    run_resolved(line).1
}

/// Like `run`, also returning the tokenized command (`None` if `line` could
/// not be tokenized).
pub fn run_resolved(line: &str) -> (Option<CommandLine>, ExecOutcome) {
    match cmdline::parse(line) {
        Ok(cmd) => {
            let outcome = execute(&cmd);
            (Some(cmd), outcome)
        }
        Err(e) => (None, ExecOutcome::unexecutable(String::new(), e)),
    }
}

/// Execute a tokenized command and wait for it.
pub fn execute(cmd: &CommandLine) -> ExecOutcome {
    let mut captured = Vec::new();
    match spawn_and_wait(cmd, &mut captured) {
        Ok(status) => {
            let output = decode_output(&captured);
            match status.code() {
                Some(code) => ExecOutcome {
                    value: code,
                    output,
                    error: String::new(),
                },
                None => ExecOutcome::unexecutable(output, describe_abnormal_exit(status)),
            }
        }
        Err(e) => {
            tracing::debug!(program = %cmd.program, error = %e, "command could not be executed");
            ExecOutcome::unexecutable(decode_output(&captured), e)
        }
    }
}

fn spawn_and_wait(cmd: &CommandLine, captured: &mut Vec<u8>) -> io::Result<ExitStatus> {
    let (mut reader, writer) = io::pipe()?;

    // `Command` keeps its copies of the write end alive; it must be dropped
    // before reading or EOF never arrives.
    let mut child = {
        let mut command = Command::new(&cmd.program);
        command
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);
        command.spawn()?
    };

    let read = reader.read_to_end(captured);
    let status = child.wait()?;
    read?;
    Ok(status)
}

fn decode_output(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    trim_trailing_newline(&text).to_string()
}

#[cfg(unix)]
fn describe_abnormal_exit(status: ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;

    match status.signal() {
        Some(sig) => format!("terminated by signal {sig}"),
        None => format!("abnormal exit: {status}"),
    }
}

#[cfg(not(unix))]
fn describe_abnormal_exit(status: ExitStatus) -> String {
    format!("abnormal exit: {status}")
}
