//! Testable subprocess execution.
//!
//! The `CommandExecutor` trait wraps `std::process::Command` behind an
//! object-safe seam so every tool invocation (yt-dlp, ffprobe, ffmpeg) can be
//! scripted in tests. Unlike a plain stdout capture, the output carries stderr
//! and the exit status: ffmpeg reports end-of-stream conditions through stderr
//! of a failed run, and the extractor needs to classify those.

use crate::error::{PolysubError, Result};
use std::collections::VecDeque;
use std::process::Command;
use std::sync::Mutex;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl CommandOutput {
    /// A successful run with the given stdout.
    pub fn ok(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
            success: true,
        }
    }

    /// A failed run with the given stderr.
    pub fn failed(stderr: &str) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.to_string(),
            success: false,
        }
    }
}

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
/// Enables testability by allowing mock implementations.
pub trait CommandExecutor: Send + Sync {
    /// Run a command to completion and capture its output.
    ///
    /// Returns `Ok` for any command that ran, successful or not; the exit
    /// status lands in [`CommandOutput::success`]. Returns an error only when
    /// the command could not be started.
    fn execute(&self, command: &str, args: &[&str]) -> Result<CommandOutput>;
}

impl<T: CommandExecutor + ?Sized> CommandExecutor for std::sync::Arc<T> {
    fn execute(&self, command: &str, args: &[&str]) -> Result<CommandOutput> {
        (**self).execute(command, args)
    }
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::new(command).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PolysubError::CommandNotFound {
                    tool: command.to_string(),
                }
            } else if e.kind() == std::io::ErrorKind::PermissionDenied {
                PolysubError::CommandFailed {
                    command: command.to_string(),
                    message: format!("permission denied: {}", e),
                }
            } else {
                PolysubError::CommandFailed {
                    command: command.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
        })
    }
}

/// Mock command executor for testing.
///
/// Records all command executions and returns configured outputs in order.
/// Once the queue is exhausted, further calls succeed with empty output.
#[derive(Debug, Default)]
pub struct MockCommandExecutor {
    calls: Mutex<Vec<(String, Vec<String>)>>,
    outputs: Mutex<VecDeque<Result<CommandOutput>>>,
}

impl MockCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful run with the given stdout.
    pub fn with_output(self, stdout: &str) -> Self {
        self.outputs
            .lock()
            .unwrap()
            .push_back(Ok(CommandOutput::ok(stdout)));
        self
    }

    /// Queue a run that exited nonzero with the given stderr.
    pub fn with_failed_run(self, stderr: &str) -> Self {
        self.outputs
            .lock()
            .unwrap()
            .push_back(Ok(CommandOutput::failed(stderr)));
        self
    }

    /// Queue a spawn failure.
    pub fn with_error(self, error: PolysubError) -> Self {
        self.outputs.lock().unwrap().push_back(Err(error));
        self
    }

    /// Get all recorded calls.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Get a specific call by index.
    pub fn call(&self, index: usize) -> Option<(String, Vec<String>)> {
        self.calls.lock().unwrap().get(index).cloned()
    }
}

impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push((
            command.to_string(),
            args.iter().map(|s| s.to_string()).collect(),
        ));

        self.outputs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(CommandOutput::ok("")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_executor_is_object_safe() {
        let executor: Box<dyn CommandExecutor> = Box::new(MockCommandExecutor::new());
        let result = executor.execute("echo", &["test"]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_mock_executor_records_calls() {
        let mock = MockCommandExecutor::new();

        mock.execute("ffprobe", &["-i", "audio.webm"]).unwrap();
        mock.execute("ffmpeg", &["-ss", "55"]).unwrap();

        assert_eq!(mock.call_count(), 2);

        let call1 = mock.call(0).unwrap();
        assert_eq!(call1.0, "ffprobe");
        assert_eq!(call1.1, vec!["-i", "audio.webm"]);

        let call2 = mock.call(1).unwrap();
        assert_eq!(call2.0, "ffmpeg");
        assert_eq!(call2.1, vec!["-ss", "55"]);
    }

    #[test]
    fn test_mock_executor_returns_outputs_in_order() {
        let mock = MockCommandExecutor::new()
            .with_output("130.5")
            .with_failed_run("End of file");

        let first = mock.execute("ffprobe", &[]).unwrap();
        assert!(first.success);
        assert_eq!(first.stdout, "130.5");

        let second = mock.execute("ffmpeg", &[]).unwrap();
        assert!(!second.success);
        assert_eq!(second.stderr, "End of file");

        // Exhausted queue falls back to empty success
        let third = mock.execute("ffmpeg", &[]).unwrap();
        assert!(third.success);
        assert_eq!(third.stdout, "");
    }

    #[test]
    fn test_mock_executor_returns_configured_error() {
        let mock = MockCommandExecutor::new().with_error(PolysubError::CommandNotFound {
            tool: "yt-dlp".to_string(),
        });

        let err = mock.execute("yt-dlp", &[]).unwrap_err();
        assert!(matches!(err, PolysubError::CommandNotFound { .. }));
    }

    #[test]
    fn test_system_executor_runs_true() {
        let executor = SystemCommandExecutor::new();
        let output = executor.execute("true", &[]).unwrap();
        assert!(output.success);
    }

    #[test]
    fn test_system_executor_captures_stdout() {
        let executor = SystemCommandExecutor::new();
        let output = executor.execute("echo", &["hello"]).unwrap();
        assert!(output.success);
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn test_system_executor_reports_nonzero_exit() {
        let executor = SystemCommandExecutor::new();
        let output = executor.execute("false", &[]).unwrap();
        assert!(!output.success);
    }

    #[test]
    fn test_system_executor_not_found() {
        let executor = SystemCommandExecutor::new();
        let err = executor
            .execute("nonexistent-command-xyz-12345", &[])
            .unwrap_err();
        assert!(matches!(err, PolysubError::CommandNotFound { .. }));
    }

    #[test]
    fn test_arc_executor_delegates() {
        let mock = std::sync::Arc::new(MockCommandExecutor::new().with_output("out"));
        let output = mock.execute("tool", &[]).unwrap();
        assert_eq!(output.stdout, "out");
        assert_eq!(mock.call_count(), 1);
    }
}
