use std::path::PathBuf;

use thiserror::Error;

use crate::i18n::Message;

/// Failures surfaced by the record store.
///
/// A missing table file is not an error: it loads as an empty table.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("failed to write {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid input: {0}")]
    Validation(String),
}

impl StoreError {
    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    /// csv reports I/O failures through its own error type.
    pub(crate) fn from_csv_write(path: impl Into<PathBuf>, err: csv::Error) -> Self {
        let source = match err.into_kind() {
            csv::ErrorKind::Io(io) => io,
            other => std::io::Error::other(format!("{other:?}")),
        };
        Self::persistence(path, source)
    }

    /// Bilingual description for display by a presentation adapter.
    #[must_use]
    pub fn message(&self) -> Message {
        match self {
            Self::Parse { path, reason } => Message::new(
                format!(
                    "データの読み込み中にエラーが発生しました ({}): {reason}",
                    path.display()
                ),
                format!(
                    "An error occurred while loading data ({}): {reason}",
                    path.display()
                ),
            ),
            Self::Persistence { path, source } => Message::new(
                format!(
                    "データの保存中にエラーが発生しました ({}): {source}",
                    path.display()
                ),
                format!(
                    "An error occurred while saving data ({}): {source}",
                    path.display()
                ),
            ),
            Self::Validation(reason) => Message::new(
                format!("入力内容が正しくありません: {reason}"),
                format!("Invalid input: {reason}"),
            ),
        }
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
