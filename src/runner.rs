use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use cfg_if::cfg_if;
use tracing::debug;
use wait_timeout::ChildExt;

use crate::config::BuildCommand;
use crate::pipeline::CheckError;
use crate::runner_file_utils::find_on_path;

/// How a child process that did not succeed came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    Failure(i32),
    SignalAbort,
    SigSegv,
    SigFpe,
    SigKill,
    OtherSignal(i32),
    Unknown,
}

impl ProcessResult {
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ProcessResult::Failure(code);
        }
        from_signal(&status)
    }
}

cfg_if! {
    if #[cfg(unix)] {
        fn from_signal(status: &ExitStatus) -> ProcessResult {
            use std::os::unix::process::ExitStatusExt;
            match status.signal() {
                Some(libc::SIGABRT) => ProcessResult::SignalAbort,
                Some(libc::SIGSEGV) => ProcessResult::SigSegv,
                Some(libc::SIGFPE) => ProcessResult::SigFpe,
                Some(libc::SIGKILL) => ProcessResult::SigKill,
                Some(other) => ProcessResult::OtherSignal(other),
                None => ProcessResult::Unknown,
            }
        }
    } else {
        fn from_signal(_status: &ExitStatus) -> ProcessResult {
            ProcessResult::Unknown
        }
    }
}

cfg_if! {
    if #[cfg(unix)] {
        /// Puts the child in its own process group so a time limit can take
        /// down anything it forks.
        fn isolate(cmd: &mut Command) {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        fn kill_tree(child: &mut Child) -> io::Result<()> {
            let pgid = child.id() as libc::pid_t;
            // SAFETY: plain syscall on a process group we created.
            if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
                return child.kill();
            }
            Ok(())
        }
    } else {
        fn isolate(_cmd: &mut Command) {}

        fn kill_tree(child: &mut Child) -> io::Result<()> {
            child.kill()
        }
    }
}

impl fmt::Display for ProcessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessResult::Failure(code) => write!(f, "exit code {code}"),
            ProcessResult::SignalAbort => f.write_str("SIGABRT"),
            ProcessResult::SigSegv => f.write_str("SIGSEGV"),
            ProcessResult::SigFpe => f.write_str("SIGFPE"),
            ProcessResult::SigKill => f.write_str("SIGKILL"),
            ProcessResult::OtherSignal(sig) => write!(f, "signal {sig}"),
            ProcessResult::Unknown => f.write_str("unknown status"),
        }
    }
}

/// Builds the submission inside `src_dir` and returns the absolute path of
/// the produced binary.
pub fn build(src_dir: &Path, cmd: &BuildCommand) -> Result<PathBuf, CheckError> {
    let toolchain = find_on_path(&cmd.program).ok_or_else(|| CheckError::ToolchainNotFound {
        program: cmd.program.clone(),
    })?;
    debug!(toolchain = %toolchain.display(), args = ?cmd.args, "building submission");

    let output = Command::new(&toolchain)
        .args(&cmd.args)
        .current_dir(src_dir)
        .stdin(Stdio::null())
        .output()
        .map_err(CheckError::Spawn)?;

    if !output.status.success() {
        debug!(
            stderr = %String::from_utf8_lossy(&output.stderr),
            "build output"
        );
        return Err(CheckError::BuildFailed {
            status: ProcessResult::from_status(output.status).to_string(),
        });
    }

    Ok(fs::canonicalize(src_dir.join(&cmd.output))?)
}

/// Runs `<binary> <flag>` with `input` on stdin and returns everything the
/// process wrote to stdout. Without a `limit` this blocks until the child exits.
/// With one, the child and everything it forked is killed when time runs out.
pub fn run_scheduler(
    binary: &Path,
    flag: &str,
    input: &[u8],
    limit: Option<Duration>,
) -> Result<Vec<u8>, CheckError> {
    let mut cmd = Command::new(binary);
    cmd.arg(flag)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    if limit.is_some() {
        isolate(&mut cmd);
    }
    let mut child = cmd.spawn().map_err(CheckError::Spawn)?;

    // Feed stdin and drain stdout on their own threads so neither pipe can
    // fill up and stall the child.
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| io::Error::other("child stdin was not captured"))?;
    let input = input.to_vec();
    let writer = thread::spawn(move || stdin.write_all(&input));

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
    let reader = thread::spawn(move || -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf)?;
        Ok(buf)
    });

    let status = match limit {
        Some(limit) => match child.wait_timeout(limit)? {
            Some(status) => status,
            None => {
                kill_tree(&mut child)?;
                child.wait()?;
                let _ = writer.join();
                let _ = reader.join();
                return Err(CheckError::TimedOut {
                    flag: flag.to_string(),
                    limit,
                });
            }
        },
        None => child.wait()?,
    };

    // A scheduler that exits without reading all of stdin is not an error.
    if let Ok(Err(e)) = writer.join() {
        debug!(flag, err = %e, "scheduler did not consume all input");
    }

    let captured = reader
        .join()
        .map_err(|_| io::Error::other("stdout reader panicked"))??;

    if !status.success() {
        return Err(CheckError::SchedulerFailed {
            flag: flag.to_string(),
            status: ProcessResult::from_status(status).to_string(),
        });
    }

    Ok(captured)
}

/// Index of the first byte at which `actual` and `expected` disagree, or
/// `None` if they are identical.
pub fn first_difference(actual: &[u8], expected: &[u8]) -> Option<usize> {
    if actual == expected {
        return None;
    }
    let offset = actual
        .iter()
        .zip(expected)
        .position(|(a, e)| a != e)
        .unwrap_or_else(|| actual.len().min(expected.len()));
    Some(offset)
}
