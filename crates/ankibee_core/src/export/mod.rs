//! Deck export: media staging, the packager protocol and orchestration.
//!
//! # Example
//!
//! ```no_run
//! use ankibee_core::export::{DeckExporter, FixedPath, MediaStager, Packager};
//! # async fn run(cards: Vec<ankibee_core::models::Card>) -> Result<(), ankibee_core::export::ExportError> {
//! let exporter = DeckExporter::new(
//!     Packager::new("python3", "packager/generate_deck.py"),
//!     MediaStager::new("/tmp/anki-exports"),
//!     "/home/me/Downloads",
//! );
//! let result = exporter
//!     .export_deck("Spelling", &cards, &FixedPath::new("/tmp/Spelling.apkg"))
//!     .await?;
//! println!("wrote {}", result.file_path.display());
//! # Ok(())
//! # }
//! ```

mod errors;
mod exporter;
mod packager;
mod prompt;
mod protocol;
mod stager;
mod types;

pub use errors::{ExportError, StageError};
pub use exporter::{DeckExporter, DECK_EXTENSION};
pub use packager::{Packager, RunningPackager, DEFAULT_CHECK_ARGS, DEFAULT_INSTALL_HINT, DEFAULT_RUNTIME};
pub use prompt::{FixedPath, SavePathPrompt};
pub use protocol::{ExportRequest, PackagerResponse, WireCard, PROTOCOL_VERSION};
pub use stager::MediaStager;
pub use types::{ExportPhase, ExportResult, PhaseCallback};
