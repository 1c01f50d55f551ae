use crate::domain::{BoardId, CardId, ColumnId, EntityKind};
use crate::sync::Operation;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

/// Failure reported by a [`RemoteStore`](crate::remote::RemoteStore) call
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store rejected request: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RemoteError {
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Broad category of a [`SyncError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected locally, no remote call was made
    Validation,
    /// Local state does not allow the operation, no remote call was made
    Precondition,
    /// The store failed or returned unusable data
    Remote,
    Config,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("cannot delete last board")]
    LastBoard,

    #[error("No board is selected")]
    NoCurrentBoard,

    #[error("Board not found: {0}")]
    BoardNotFound(BoardId),

    #[error("Column not found: {0}")]
    ColumnNotFound(ColumnId),

    #[error("Card not found: {0}")]
    CardNotFound(CardId),

    #[error("Board {board} returned by the store is inconsistent: {reason}")]
    InconsistentBoard { board: BoardId, reason: String },

    #[error("{operation} failed: {source}")]
    Remote {
        operation: Operation,
        #[source]
        source: RemoteError,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyTitle => ErrorKind::Validation,
            Self::LastBoard
            | Self::NoCurrentBoard
            | Self::BoardNotFound(_)
            | Self::ColumnNotFound(_)
            | Self::CardNotFound(_) => ErrorKind::Precondition,
            Self::InconsistentBoard { .. } | Self::Remote { .. } => ErrorKind::Remote,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// True when the operation was rejected before any remote call
    pub fn is_local(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::Precondition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_board_message() {
        assert_eq!(SyncError::LastBoard.to_string(), "cannot delete last board");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(SyncError::EmptyTitle.kind(), ErrorKind::Validation);
        assert_eq!(SyncError::LastBoard.kind(), ErrorKind::Precondition);
        assert!(SyncError::ColumnNotFound(ColumnId::from("c1")).is_local());

        let err = SyncError::Remote {
            operation: Operation::MoveCard,
            source: RemoteError::Unavailable("connection reset".to_string()),
        };
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert!(!err.is_local());
        assert_eq!(
            err.to_string(),
            "move_card failed: Store unavailable: connection reset"
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = RemoteError::not_found(EntityKind::Card, "k9");
        assert_eq!(err.to_string(), "Card not found: k9");
    }
}
