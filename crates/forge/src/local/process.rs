// Path: crates/forge/src/local/process.rs

//! Node process creation and lifecycle.
//!
//! The orchestrator never touches `tokio::process` directly. It asks a
//! [`NodeProcessCreator`] for a [`NodeProcess`] and drives it through
//! `start`, `stop` and `wait`, which lets tests substitute in-memory processes.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use colored::{Color, Colorize};
use netrunner_types::NodeConfig;
use parking_lot::Mutex;
use std::io::Write;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

/// Shared sink that forwarded node output is written to.
pub type OutputWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// How long `wait` lingers for the output forwarders to drain after the process exits.
const FORWARDER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Wraps a standard stream (or any writer) as an [`OutputWriter`].
pub fn stdio_writer(writer: impl Write + Send + 'static) -> OutputWriter {
    Arc::new(Mutex::new(Box::new(writer)))
}

/// A running (or runnable) node.
#[async_trait]
pub trait NodeProcess: Send {
    /// Launches the process. Called exactly once.
    fn start(&mut self) -> Result<()>;
    /// Asks the process to terminate. Does not wait for it to exit.
    fn stop(&mut self) -> Result<()>;
    /// Waits for the process to exit. Fails if it exited with an error.
    async fn wait(&mut self) -> Result<()>;
}

/// Creates the process for a node from its config and rendered command line.
pub trait NodeProcessCreator: Send + Sync {
    fn new_node_process(&self, config: &NodeConfig, args: &[String])
        -> Result<Box<dyn NodeProcess>>;
}

const COLORS: [Color; 8] = [
    Color::Green,
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Blue,
    Color::BrightGreen,
    Color::BrightCyan,
    Color::BrightMagenta,
];

/// Hands out label colours round-robin so that each node's output is distinguishable.
#[derive(Debug, Default)]
pub struct ColorPicker {
    next: usize,
}

impl ColorPicker {
    pub fn next_color(&mut self) -> Color {
        let color = COLORS.get(self.next % COLORS.len()).copied().unwrap_or(Color::White);
        self.next = self.next.wrapping_add(1);
        color
    }
}

/// Runs nodes as child processes of the runner.
pub struct LocalProcessCreator {
    colors: Mutex<ColorPicker>,
    stdout: OutputWriter,
    stderr: OutputWriter,
}

impl Default for LocalProcessCreator {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalProcessCreator {
    /// Forwards redirected node output to the runner's own stdout and stderr.
    pub fn new() -> Self {
        Self::with_writers(stdio_writer(std::io::stdout()), stdio_writer(std::io::stderr()))
    }

    pub fn with_writers(stdout: OutputWriter, stderr: OutputWriter) -> Self {
        Self {
            colors: Mutex::new(ColorPicker::default()),
            stdout,
            stderr,
        }
    }
}

impl NodeProcessCreator for LocalProcessCreator {
    fn new_node_process(
        &self,
        config: &NodeConfig,
        args: &[String],
    ) -> Result<Box<dyn NodeProcess>> {
        let local = &config.impl_specific_config;
        if local.binary_path.as_os_str().is_empty() {
            return Err(anyhow!("no binary path given"));
        }

        let mut command = Command::new(&local.binary_path);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(if local.redirect_stdout {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stderr(if local.redirect_stderr {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);

        let label = format!("[{}]", config.name_or_default())
            .color(self.colors.lock().next_color())
            .to_string();

        Ok(Box::new(LocalProcess {
            label,
            command: Some(command),
            child: None,
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
            forwarders: Vec::new(),
            stop_requested: false,
        }))
    }
}

/// A node running as a child process.
pub struct LocalProcess {
    label: String,
    command: Option<Command>,
    child: Option<Child>,
    stdout: OutputWriter,
    stderr: OutputWriter,
    forwarders: Vec<JoinHandle<()>>,
    stop_requested: bool,
}

impl LocalProcess {
    fn child_mut(&mut self) -> Result<&mut Child> {
        self.child
            .as_mut()
            .ok_or_else(|| anyhow!("process has not been started"))
    }

    fn exited_cleanly(&self, status: ExitStatus) -> bool {
        if status.success() {
            return true;
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if self.stop_requested && status.signal() == Some(libc::SIGTERM) {
                return true;
            }
        }
        false
    }
}

#[async_trait]
impl NodeProcess for LocalProcess {
    fn start(&mut self) -> Result<()> {
        let mut command = self
            .command
            .take()
            .ok_or_else(|| anyhow!("process already started"))?;
        let mut child = command.spawn().context("could not spawn node process")?;

        if let Some(out) = child.stdout.take() {
            self.forwarders.push(tokio::spawn(forward_lines(
                out,
                self.stdout.clone(),
                self.label.clone(),
            )));
        }
        if let Some(err) = child.stderr.take() {
            self.forwarders.push(tokio::spawn(forward_lines(
                err,
                self.stderr.clone(),
                self.label.clone(),
            )));
        }
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.stop_requested = true;
        let child = self.child_mut()?;

        #[cfg(unix)]
        {
            // `None` once the child has been reaped; nothing left to signal.
            let Some(pid) = child.id() else {
                return Ok(());
            };
            let pid = libc::pid_t::try_from(pid).context("pid out of range")?;
            // SAFETY: `kill` has no memory-safety preconditions; `pid` is our own child.
            let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
            if rc != 0 {
                return Err(std::io::Error::last_os_error()).context("kill(SIGTERM) failed");
            }
            Ok(())
        }
        #[cfg(not(unix))]
        {
            child.start_kill().context("could not kill node process")
        }
    }

    async fn wait(&mut self) -> Result<()> {
        let status = self.child_mut()?.wait().await?;
        for forwarder in self.forwarders.drain(..) {
            let _ = tokio::time::timeout(FORWARDER_DRAIN_TIMEOUT, forwarder).await;
        }
        if self.exited_cleanly(status) {
            Ok(())
        } else {
            Err(anyhow!("node process exited with {status}"))
        }
    }
}

async fn forward_lines<R>(reader: R, writer: OutputWriter, label: String)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let mut out = writer.lock();
                let _ = writeln!(out, "{label} {line}");
                let _ = out.flush();
            }
            Ok(None) => break,
            Err(e) => {
                tracing::trace!(label = %label, error = %e, "stopped forwarding node output");
                break;
            }
        }
    }
}
