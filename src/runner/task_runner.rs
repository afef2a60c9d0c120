//! # Task Runner Module
//!
//! Worker per l'esecuzione del tool su un singolo file.
//! Avvia il processo, inoltra ogni riga di stdout/stderr al sink man mano che
//! arriva, attende l'uscita e misura l'artifact prodotto.

use std::future::pending;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, Command};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::args;
use crate::job::{JobOutcome, TaskReport};
use crate::log::{LogKind, LogLine, OutputSink};
use crate::runner::path_resolver::PathResolver;

/// How the wait on a child process ended
enum Waited {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

/// Runs the external tool on one file at a time
#[derive(Debug, Clone)]
pub struct TaskRunner {
    tool_path: PathBuf,
    quality: u8,
    artifact_suffix: String,
    skip_if_larger: bool,
    timeout: Option<Duration>,
}

impl TaskRunner {
    pub fn new(
        tool_path: PathBuf,
        quality: u8,
        artifact_suffix: String,
        skip_if_larger: bool,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            tool_path,
            quality,
            artifact_suffix,
            skip_if_larger,
            timeout,
        }
    }

    /// Flags passed before the source path
    pub fn flag_args(&self) -> Vec<String> {
        let mut args = args!["--verbose", "--quality", self.quality];
        if self.skip_if_larger {
            args.push("--skip-if-larger".to_string());
        }
        args
    }

    /// Run the tool on `source`, streaming its output to `sink`.
    ///
    /// Never fails: launch errors, timeouts and cancellation are reported in
    /// the returned [`TaskReport`] and in the log.
    pub async fn run(
        &self,
        source: &Path,
        sink: &dyn OutputSink,
        stop: Option<&mut broadcast::Receiver<()>>,
    ) -> TaskReport {
        sink.emit(&LogLine::started(source));

        let mut command = Command::new(&self.tool_path);
        command
            .args(self.flag_args())
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Command: {:?} {:?} {}", self.tool_path, self.flag_args(), source.display());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to launch {}: {}", self.tool_path.display(), e);
                let reason = format!("could not launch {}: {}", self.tool_path.display(), e);
                sink.emit(&LogLine::failed(source, reason.clone()));
                sink.emit(&LogLine::finished(source, None));
                return TaskReport::aborted(JobOutcome::Failed(reason));
            }
        };

        let waited = {
            let drive = Self::stream_until_exit(&mut child, source, sink);
            tokio::pin!(drive);

            let deadline = async {
                match self.timeout {
                    Some(limit) => tokio::time::sleep(limit).await,
                    None => pending().await,
                }
            };

            let stopped = async {
                match stop {
                    Some(receiver) => match receiver.recv().await {
                        Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                        // Sender dropped: nobody can cancel anymore
                        Err(broadcast::error::RecvError::Closed) => pending().await,
                    },
                    None => pending().await,
                }
            };

            tokio::select! {
                status = &mut drive => Waited::Exited(status),
                _ = deadline => Waited::TimedOut,
                _ = stopped => Waited::Cancelled,
            }
        };

        match waited {
            Waited::Exited(Ok(status)) => {
                let exit_code = status.code();
                sink.emit(&LogLine::finished(source, exit_code));

                let bytes_after = PathResolver::artifact_size(source, &self.artifact_suffix).await;
                TaskReport::completed(exit_code, bytes_after)
            }
            Waited::Exited(Err(e)) => {
                warn!("Failed to wait for {}: {}", self.tool_path.display(), e);
                let reason = format!("could not wait for {}: {}", self.tool_path.display(), e);
                sink.emit(&LogLine::failed(source, reason.clone()));
                sink.emit(&LogLine::finished(source, None));
                TaskReport::aborted(JobOutcome::Failed(reason))
            }
            Waited::TimedOut => {
                Self::kill(&mut child, source).await;
                let limit = self.timeout.unwrap_or_default();
                warn!("Timed out after {:?}: {}", limit, source.display());
                sink.emit(&LogLine::failed(source, format!("timed out after {:?}", limit)));
                sink.emit(&LogLine::finished(source, None));
                TaskReport::aborted(JobOutcome::TimedOut)
            }
            Waited::Cancelled => {
                Self::kill(&mut child, source).await;
                sink.emit(&LogLine::failed(source, "cancelled"));
                sink.emit(&LogLine::finished(source, None));
                TaskReport::aborted(JobOutcome::Cancelled)
            }
        }
    }

    /// Forward stdout and stderr lines until both streams close, then reap the child
    async fn stream_until_exit(
        child: &mut Child,
        source: &Path,
        sink: &dyn OutputSink,
    ) -> std::io::Result<ExitStatus> {
        let mut stdout = child.stdout.take().map(|s| BufReader::new(s).lines());
        let mut stderr = child.stderr.take().map(|s| BufReader::new(s).lines());
        let mut stdout_open = stdout.is_some();
        let mut stderr_open = stderr.is_some();

        while stdout_open || stderr_open {
            tokio::select! {
                line = next_line(&mut stdout), if stdout_open => match line {
                    Some(line) => sink.emit(&LogLine::new(source, LogKind::Stdout(line))),
                    None => stdout_open = false,
                },
                line = next_line(&mut stderr), if stderr_open => match line {
                    Some(line) => sink.emit(&LogLine::new(source, LogKind::Stderr(line))),
                    None => stderr_open = false,
                },
            }
        }

        child.wait().await
    }

    async fn kill(child: &mut Child, source: &Path) {
        if let Err(e) = child.kill().await {
            warn!("Failed to kill tool for {}: {}", source.display(), e);
        }
    }
}

/// Next line of a stream; `None` at end of stream or on a read error
async fn next_line<R>(lines: &mut Option<Lines<R>>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    match lines {
        Some(lines) => match lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                debug!("Stopped reading tool output: {}", e);
                None
            }
        },
        None => None,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::log::SharedLog;
    use crate::test_support::{fake_pngquant, write_file, write_script};
    use tempfile::TempDir;

    fn runner(tool: PathBuf) -> TaskRunner {
        TaskRunner::new(tool, 80, "-fs8".to_string(), true, Some(Duration::from_secs(10)))
    }

    #[test]
    fn test_flag_args() {
        let mut task = runner(PathBuf::from("pngquant"));
        assert_eq!(task.flag_args(), vec!["--verbose", "--quality", "80", "--skip-if-larger"]);

        task.skip_if_larger = false;
        assert_eq!(task.flag_args(), vec!["--verbose", "--quality", "80"]);
    }

    #[tokio::test]
    async fn test_streams_output_and_measures_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let tool = fake_pngquant(temp_dir.path());
        let source = write_file(temp_dir.path(), "a.png", 1000);
        let log = SharedLog::new();

        let report = runner(tool).run(&source, &log, None).await;

        assert_eq!(report, TaskReport::completed(Some(0), Some(400)));

        let lines = log.lines();
        assert!(lines.first().unwrap().is_started());
        assert_eq!(lines.last().unwrap().kind, LogKind::Finished(Some(0)));
        assert!(lines.contains(&LogLine::new(&source, LogKind::Stdout(format!("quality 80 {}", source.display())))));
        assert!(lines.contains(&LogLine::new(&source, LogKind::Stderr(format!("{}:", source.display())))));
    }

    #[tokio::test]
    async fn test_path_with_spaces_is_one_argument() {
        let temp_dir = TempDir::new().unwrap();
        let tool = fake_pngquant(temp_dir.path());
        let source = write_file(temp_dir.path(), "hero shot a.png", 1000);

        let report = runner(tool).run(&source, &SharedLog::new(), None).await;

        assert_eq!(report.bytes_after, Some(400));
        assert!(temp_dir.path().join("hero shot a-fs8.png").exists());
    }

    #[tokio::test]
    async fn test_nonzero_exit_without_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let tool = fake_pngquant(temp_dir.path());
        let source = write_file(temp_dir.path(), "b.png", 2000);
        let log = SharedLog::new();

        let report = runner(tool).run(&source, &log, None).await;

        assert_eq!(report, TaskReport::completed(Some(98), None));
        assert_eq!(log.lines().last().unwrap().to_string(), "[Finished] Error code: 98");
    }

    #[tokio::test]
    async fn test_launch_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_file(temp_dir.path(), "a.png", 1000);
        let log = SharedLog::new();

        let report = runner(temp_dir.path().join("missing-tool")).run(&source, &log, None).await;

        assert!(matches!(report.outcome, JobOutcome::Failed(_)));
        assert_eq!(report.exit_code, None);
        let kinds: Vec<_> = log.lines().into_iter().map(|l| l.kind).collect();
        assert_eq!(kinds.len(), 3);
        assert_eq!(kinds[0], LogKind::Started);
        assert!(matches!(kinds[1], LogKind::Failed(_)));
        assert_eq!(kinds[2], LogKind::Finished(None));
    }

    #[tokio::test]
    async fn test_timeout_kills_the_tool() {
        let temp_dir = TempDir::new().unwrap();
        let tool = write_script(temp_dir.path(), "slow", "exec sleep 10\n");
        let source = write_file(temp_dir.path(), "a.png", 1000);

        let task = TaskRunner::new(tool, 80, "-fs8".to_string(), true, Some(Duration::from_millis(200)));
        let report = task.run(&source, &SharedLog::new(), None).await;

        assert_eq!(report.outcome, JobOutcome::TimedOut);
        assert_eq!(report.bytes_after, None);
    }

    #[tokio::test]
    async fn test_stop_signal_cancels_the_tool() {
        let temp_dir = TempDir::new().unwrap();
        let tool = write_script(temp_dir.path(), "slow", "exec sleep 10\n");
        let source = write_file(temp_dir.path(), "a.png", 1000);
        let (stop_sender, mut stop_receiver) = broadcast::channel(1);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = stop_sender.send(());
        });

        let report = runner(tool).run(&source, &SharedLog::new(), Some(&mut stop_receiver)).await;
        assert_eq!(report.outcome, JobOutcome::Cancelled);
    }
}
