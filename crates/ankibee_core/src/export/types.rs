//! Export phases, results and callbacks.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where an export currently is.
///
/// Phases only move forward. Any phase before `Cleanup` may jump straight to
/// `Failed`; once staging has produced files `Cleanup` always runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPhase {
    Idle,
    VerifyingRuntime,
    AwaitingPath,
    Validating,
    Staging,
    Spawning,
    Running,
    Cleanup,
    Succeeded,
    Failed,
}

impl ExportPhase {
    /// Whether the export has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExportPhase::Succeeded | ExportPhase::Failed)
    }
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportPhase::Idle => "idle",
            ExportPhase::VerifyingRuntime => "verifying runtime",
            ExportPhase::AwaitingPath => "awaiting output path",
            ExportPhase::Validating => "validating cards",
            ExportPhase::Staging => "staging media",
            ExportPhase::Spawning => "starting packager",
            ExportPhase::Running => "packaging",
            ExportPhase::Cleanup => "cleaning up",
            ExportPhase::Succeeded => "succeeded",
            ExportPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Callback invoked on every phase transition.
pub type PhaseCallback = Box<dyn Fn(ExportPhase) + Send + Sync>;

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub success: bool,
    pub file_path: PathBuf,
}
