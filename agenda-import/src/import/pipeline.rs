//! One import run, from file to outcome
//!
//! ```text
//! Idle -> Decoding -> Previewed -> Importing -> Completed
//!            |                              \-> CompletedWithFailures
//!            \-> Failed
//! ```

use std::path::Path;

use crate::store::RecordStore;

use super::batch::{BatchOptions, CancelFlag, ImportOutcome, ImportProgress, import_records};
use super::decoder::{ContainerKind, DecodeError, decode};
use super::validation::Preview;

/// Phase of an import run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Idle,
    Decoding,
    /// Rows decoded and validated, waiting for confirmation
    Previewed,
    Importing,
    Completed,
    CompletedWithFailures,
    Failed,
}

impl std::fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportPhase::Idle => write!(f, "Idle"),
            ImportPhase::Decoding => write!(f, "Decoding"),
            ImportPhase::Previewed => write!(f, "Previewed"),
            ImportPhase::Importing => write!(f, "Importing"),
            ImportPhase::Completed => write!(f, "Completed"),
            ImportPhase::CompletedWithFailures => write!(f, "Completed with failures"),
            ImportPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Error returned by run-level operations
#[derive(Debug, Clone, PartialEq)]
pub enum RunError {
    /// The file could not be decoded; the run is now `Failed`
    Decode(DecodeError),
    /// Operation called in the wrong phase
    InvalidPhase {
        operation: &'static str,
        phase: ImportPhase,
    },
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Decode(e) => write!(f, "{}", e),
            RunError::InvalidPhase { operation, phase } => {
                write!(f, "Cannot {} while the import is {}", operation, phase)
            }
        }
    }
}

impl std::error::Error for RunError {}

impl From<DecodeError> for RunError {
    fn from(e: DecodeError) -> Self {
        RunError::Decode(e)
    }
}

/// State of a single import run
#[derive(Debug)]
pub struct ImportRun {
    phase: ImportPhase,
    preview: Option<Preview>,
    outcome: Option<ImportOutcome>,
}

impl Default for ImportRun {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportRun {
    pub fn new() -> Self {
        Self {
            phase: ImportPhase::Idle,
            preview: None,
            outcome: None,
        }
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    fn transition(&mut self, next: ImportPhase) {
        log::debug!("Import run: {} -> {}", self.phase, next);
        self.phase = next;
    }

    fn expect_phase(&self, operation: &'static str, expected: ImportPhase) -> Result<(), RunError> {
        if self.phase != expected {
            return Err(RunError::InvalidPhase {
                operation,
                phase: self.phase,
            });
        }
        Ok(())
    }

    /// Decode and validate in-memory content
    pub async fn decode_bytes(
        &mut self,
        bytes: Vec<u8>,
        kind: ContainerKind,
    ) -> Result<&Preview, RunError> {
        self.expect_phase("decode", ImportPhase::Idle)?;
        self.transition(ImportPhase::Decoding);

        let decoded = tokio::task::spawn_blocking(move || {
            decode(&bytes, kind).map(|rows| Preview::from_rows(&rows))
        })
        .await
        .unwrap_or_else(|e| Err(DecodeError::Io(e.to_string())));

        match decoded {
            Ok(preview) => {
                log::info!(
                    "Validated {} rows: {} valid, {} invalid",
                    preview.total(),
                    preview.valid_count(),
                    preview.invalid_count()
                );
                self.transition(ImportPhase::Previewed);
                Ok(&*self.preview.insert(preview))
            }
            Err(e) => {
                log::error!("Decoding failed: {}", e);
                self.transition(ImportPhase::Failed);
                Err(RunError::Decode(e))
            }
        }
    }

    /// Read, decode and validate a file; the container kind comes from its extension
    pub async fn decode_file(&mut self, path: &Path) -> Result<&Preview, RunError> {
        self.expect_phase("decode", ImportPhase::Idle)?;

        let loaded = match ContainerKind::from_path(path) {
            Ok(kind) => tokio::fs::read(path)
                .await
                .map(|bytes| (bytes, kind))
                .map_err(|e| DecodeError::Io(format!("{}: {}", path.display(), e))),
            Err(e) => Err(e),
        };

        match loaded {
            Ok((bytes, kind)) => self.decode_bytes(bytes, kind).await,
            Err(e) => {
                log::error!("Decoding failed: {}", e);
                self.transition(ImportPhase::Failed);
                Err(RunError::Decode(e))
            }
        }
    }

    /// Import the previewed valid records
    pub async fn import<F>(
        &mut self,
        store: &dyn RecordStore,
        options: &BatchOptions,
        cancel: Option<&CancelFlag>,
        on_progress: F,
    ) -> Result<&ImportOutcome, RunError>
    where
        F: FnMut(ImportProgress),
    {
        self.expect_phase("import", ImportPhase::Previewed)?;
        let records = self
            .preview
            .as_ref()
            .map(Preview::valid_records)
            .unwrap_or_default();

        self.transition(ImportPhase::Importing);
        let outcome = import_records(store, &records, options, cancel, on_progress).await;

        self.transition(if outcome.has_failures() {
            ImportPhase::CompletedWithFailures
        } else {
            ImportPhase::Completed
        });
        Ok(&*self.outcome.insert(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const CSV: &str = "titulo,data,tipo\n\
        Reunião,15/02/2026,reuniao\n\
        ,20/02/2026,tarefa\n\
        Lembrete X,31/13/2026,lembrete\n";

    #[tokio::test]
    async fn test_full_run() {
        let mut run = ImportRun::new();
        assert_eq!(run.phase(), ImportPhase::Idle);

        let preview = run
            .decode_bytes(CSV.as_bytes().to_vec(), ContainerKind::Delimited)
            .await
            .unwrap();
        assert_eq!(preview.valid_count(), 1);
        assert_eq!(run.phase(), ImportPhase::Previewed);

        let store = MemoryStore::new();
        let outcome = run
            .import(&store, &BatchOptions::new("me"), None, |_| {})
            .await
            .unwrap()
            .clone();

        assert_eq!(outcome.success_count, 1);
        assert_eq!(run.phase(), ImportPhase::Completed);
        assert_eq!(store.records().len(), 1);
        assert_eq!(store.records()[0].title, "Reunião");
    }

    #[tokio::test]
    async fn test_failures_end_in_completed_with_failures() {
        let mut run = ImportRun::new();
        run.decode_bytes(CSV.as_bytes().to_vec(), ContainerKind::Delimited)
            .await
            .unwrap();

        let store = MemoryStore::rejecting([1]);
        let failed = run
            .import(&store, &BatchOptions::new("me"), None, |_| {})
            .await
            .unwrap()
            .failed_count;
        assert_eq!(failed, 1);
        assert_eq!(run.phase(), ImportPhase::CompletedWithFailures);
    }

    #[tokio::test]
    async fn test_decode_failure_is_terminal() {
        let mut run = ImportRun::new();
        let result = run
            .decode_bytes(b"garbage".to_vec(), ContainerKind::Spreadsheet)
            .await;
        assert!(matches!(result, Err(RunError::Decode(_))));
        assert_eq!(run.phase(), ImportPhase::Failed);
        assert!(run.preview().is_none());

        let store = MemoryStore::new();
        let result = run.import(&store, &BatchOptions::new("me"), None, |_| {}).await;
        assert!(matches!(result, Err(RunError::InvalidPhase { .. })));
        assert!(store.batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_extension_fails_run() {
        let mut run = ImportRun::new();
        let result = run.decode_file(Path::new("events.pdf")).await;
        assert!(matches!(
            result,
            Err(RunError::Decode(DecodeError::UnsupportedFormat(_)))
        ));
        assert_eq!(run.phase(), ImportPhase::Failed);
    }

    #[tokio::test]
    async fn test_import_before_decode_rejected() {
        let mut run = ImportRun::new();
        let store = MemoryStore::new();
        let result = run.import(&store, &BatchOptions::new("me"), None, |_| {}).await;
        assert_eq!(
            result.err(),
            Some(RunError::InvalidPhase {
                operation: "import",
                phase: ImportPhase::Idle
            })
        );
    }
}
