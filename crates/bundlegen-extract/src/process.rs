//! Blocking interpreter invocation

use crate::errors::ExtractError;
use bundlegen_logger as logger;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(25);
const STDERR_TAIL_LINES: usize = 20;

/// One interpreter invocation
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl Invocation {
    /// Command line for messages and the log file
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Run the invocation to completion and return its stdout.
///
/// Blocks until the process exits. With a timeout, a process still running
/// afterwards is killed and reported as [`ExtractError::Timeout`]. The limit
/// also covers reading its output, so a background process that inherited
/// the pipes cannot hold the run open. A non-zero exit is
/// [`ExtractError::CommandFailed`] carrying the tail of stderr.
///
/// Without a timeout the call waits for both pipes to close, which includes
/// any descendant still holding them.
pub fn run(invocation: &Invocation, timeout: Option<Duration>) -> Result<String, ExtractError> {
    let command = invocation.display();
    debug!("Running: {} (cwd {:?})", command, invocation.working_dir);
    let start = Instant::now();

    let child = Command::new(&invocation.program)
        .args(&invocation.args)
        .current_dir(&invocation.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ExtractError::Spawn {
            command: command.clone(),
            source,
        })?;

    let output = match timeout {
        Some(limit) => wait_with_timeout(child, limit, &command)?,
        None => child.wait_with_output()?,
    };

    logger::capture_output(&command, &output);
    debug!("{} finished in {:?}", command, start.elapsed());

    if !output.status.success() {
        return Err(ExtractError::CommandFailed {
            command,
            status: output.status.code(),
            stderr: stderr_tail(&output.stderr),
        });
    }

    String::from_utf8(output.stdout).map_err(|_| ExtractError::NonUtf8Output { command })
}

fn wait_with_timeout(
    mut child: Child,
    limit: Duration,
    command: &str,
) -> Result<Output, ExtractError> {
    // Drain both pipes while polling so a chatty child cannot block on a full pipe.
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);
    let deadline = Instant::now() + limit;
    let timed_out = || ExtractError::Timeout {
        command: command.to_string(),
        secs: limit.as_secs(),
    };

    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(timed_out());
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = collect(stdout, deadline).ok_or_else(timed_out)?;
    let stderr = collect(stderr, deadline).ok_or_else(timed_out)?;
    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

/// Bytes read from one pipe, or `None` if it is still open at `deadline`.
/// A reader left behind finishes on its own once the pipe closes.
fn collect(pipe: Option<Receiver<Vec<u8>>>, deadline: Instant) -> Option<Vec<u8>> {
    let Some(rx) = pipe else {
        return Some(Vec::new());
    };
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(buf) => Some(buf),
        Err(RecvTimeoutError::Disconnected) => Some(Vec::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Invocation for a program in `working_dir`
pub fn invocation(program: &Path, args: Vec<String>, working_dir: &Path) -> Invocation {
    Invocation {
        program: program.to_path_buf(),
        args,
        working_dir: working_dir.to_path_buf(),
    }
}
