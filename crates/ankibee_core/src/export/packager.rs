//! Runs the external deck packaging tool.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use super::errors::ExportError;
use super::protocol::{ExportRequest, PackagerResponse};

/// Default interpreter used to run the packaging script.
pub const DEFAULT_RUNTIME: &str = "python3";

/// Arguments used to prove the runtime can load the packaging library.
pub const DEFAULT_CHECK_ARGS: [&str; 2] = ["-c", "import genanki"];

/// Shown when the runtime check fails.
pub const DEFAULT_INSTALL_HINT: &str =
    "Install Python 3 and the genanki library with: pip3 install genanki";

const GENERIC_FAILURE: &str = "Failed to create Anki package";

/// How to invoke the packaging tool: `<runtime> <script>`.
#[derive(Debug, Clone)]
pub struct Packager {
    runtime: PathBuf,
    script: PathBuf,
    check_args: Vec<String>,
    install_hint: String,
}

impl Packager {
    /// Create a packager running `script` with `runtime`.
    pub fn new(runtime: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            runtime: runtime.into(),
            script: script.into(),
            check_args: DEFAULT_CHECK_ARGS.iter().map(|s| s.to_string()).collect(),
            install_hint: DEFAULT_INSTALL_HINT.to_string(),
        }
    }

    /// Replace the arguments used by [`verify_runtime`](Self::verify_runtime).
    pub fn with_check_args(mut self, args: Vec<String>) -> Self {
        self.check_args = args;
        self
    }

    /// Replace the hint attached to a failed runtime check.
    pub fn with_install_hint(mut self, hint: impl Into<String>) -> Self {
        self.install_hint = hint.into();
        self
    }

    /// Interpreter path.
    pub fn runtime(&self) -> &Path {
        &self.runtime
    }

    /// Packaging script path.
    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Confirm the runtime starts and can load the packaging library.
    pub async fn verify_runtime(&self) -> Result<(), ExportError> {
        let output = Command::new(&self.runtime)
            .args(&self.check_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                ExportError::missing_runtime(
                    format!("cannot run {}: {}", self.runtime.display(), e),
                    &self.install_hint,
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = last_line(&stderr)
                .map(str::to_string)
                .unwrap_or_else(|| format!("check exited with {}", output.status));
            return Err(ExportError::missing_runtime(detail, &self.install_hint));
        }

        debug!("Packaging runtime {} is ready", self.runtime.display());
        Ok(())
    }

    /// Start the packager for `request`.
    ///
    /// Fails with [`ExportError::Spawn`] if the process cannot be started.
    pub fn spawn(&self, request: &ExportRequest) -> Result<RunningPackager, ExportError> {
        let payload = request.to_json()?;

        let child = Command::new(&self.runtime)
            .arg(&self.script)
            .env("PYTHONIOENCODING", "utf-8")
            .env("PYTHONUNBUFFERED", "1")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExportError::Spawn {
                program: self.runtime.display().to_string(),
                source,
            })?;

        debug!(
            "Spawned packager {} {} ({} byte request)",
            self.runtime.display(),
            self.script.display(),
            payload.len()
        );
        Ok(RunningPackager { child, payload })
    }
}

/// A started packager that has not been fed its request yet.
pub struct RunningPackager {
    child: Child,
    payload: Vec<u8>,
}

impl RunningPackager {
    /// Feed the request, wait for exit and decode the answer.
    ///
    /// A decoded response is returned even when it reports `success: false`;
    /// the caller decides what that means.
    pub async fn wait(mut self) -> Result<PackagerResponse, ExportError> {
        // Feed stdin while draining stdout/stderr so neither side blocks.
        let stdin = self.child.stdin.take();
        let payload = self.payload;
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&payload).await?;
                stdin.shutdown().await?;
            }
            Ok::<_, std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, self.child.wait_with_output());

        let output = output.map_err(|e| ExportError::io("waiting for the packager", e))?;
        if let Err(e) = fed {
            warn!("Packager did not accept the full request: {}", e);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            debug!(target: "ankibee::packager", "stdout: {}", line);
        }
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            debug!(target: "ankibee::packager", "stderr: {}", line);
        }

        if output.status.success() && !stdout.trim().is_empty() {
            return PackagerResponse::decode(&stdout).map_err(|e| ExportError::MalformedOutput {
                message: e.to_string(),
            });
        }

        let message = if !stderr.trim().is_empty() {
            stderr.trim().to_string()
        } else if let Some(error) = PackagerResponse::decode(&stdout).ok().and_then(|r| r.error) {
            error
        } else {
            GENERIC_FAILURE.to_string()
        };
        Err(ExportError::subprocess(output.status.to_string(), message))
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).last()
}

/// Message used when a response reports failure without saying why.
pub(crate) fn reported_failure(response: &PackagerResponse) -> String {
    response
        .error
        .clone()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}
