//! Builder for executing external tool commands with timeout support.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;

/// Default command timeout: 5 minutes.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// The child process is spawned with `kill_on_drop`, so dropping the future
/// returned by [`ToolCommand::output`] (client disconnect, timeout, shutdown)
/// terminates the tool as well. On unix the child leads its own process
/// group, and the whole group is killed, including helpers such as the
/// ffmpeg that yt-dlp starts.
///
/// # Example
///
/// ```no_run
/// use mg_extract::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> mg_core::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("yt-dlp"))
///     .arg("--dump-json")
///     .arg("https://example.com/watch?v=abc")
///     .output()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
    current_dir: Option<PathBuf>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            current_dir: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    /// Run the process from the given directory.
    pub fn current_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.current_dir = Some(dir.into());
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr, without judging the
    /// exit status.
    ///
    /// # Errors
    ///
    /// - Returns [`mg_core::Error::Tool`] if spawning the process fails.
    /// - Returns [`mg_core::Error::Tool`] if the process times out (message
    ///   includes the timeout duration). The process is killed.
    pub async fn output(&self) -> mg_core::Result<ToolOutput> {
        let program_name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }

        #[cfg(unix)]
        cmd.process_group(0);

        tracing::debug!(tool = %program_name, args = ?self.args, "Spawning tool");

        let child = cmd.spawn().map_err(|e| {
            mg_core::Error::tool(program_name.clone(), format!("failed to spawn: {e}"))
        })?;

        let mut group = ProcessGroupGuard::new(child.id());

        // Dropping the wait future on timeout drops the child, which kills it.
        // The guard then takes down whatever the child started.
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                group.disarm();
                Ok(ToolOutput {
                    status: output.status,
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                })
            }
            Ok(Err(e)) => Err(mg_core::Error::tool(
                program_name,
                format!("I/O error waiting for process: {e}"),
            )),
            Err(_elapsed) => {
                tracing::warn!(tool = %program_name, timeout = ?self.timeout, "Tool timed out; killed");
                Err(mg_core::Error::tool(
                    program_name,
                    format!("timed out after {:?}", self.timeout),
                ))
            }
        }
    }
}

/// Kills the process group led by a spawned tool when dropped, unless the
/// tool exited on its own first.
struct ProcessGroupGuard {
    pgid: Option<i32>,
}

impl ProcessGroupGuard {
    fn new(child_id: Option<u32>) -> Self {
        Self {
            pgid: child_id.and_then(|id| i32::try_from(id).ok()),
        }
    }

    fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_group(pgid);
        }
    }
}

#[cfg(unix)]
fn kill_group(pgid: i32) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        Ok(()) => tracing::debug!(pgid, "Killed tool process group"),
        Err(Errno::ESRCH) => {}
        Err(e) => tracing::warn!(pgid, "Failed to kill tool process group: {e}"),
    }
}

#[cfg(not(unix))]
fn kill_group(_pgid: i32) {}
