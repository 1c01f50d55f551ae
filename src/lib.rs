//! # Kanban Sync
//!
//! Board state synchronization engine for kanban board clients.
//!
//! This crate keeps an in-memory view of boards, columns and cards consistent
//! with an authoritative remote store. Every mutation goes to the store first;
//! local state is only replaced afterwards, either by appending the entity the
//! store returned or by re-fetching the whole board.

pub mod config;
pub mod directory;
pub mod domain;
pub mod error;
pub mod intent;
pub mod remote;
pub mod sync;

// Re-export commonly used types
pub use config::SyncConfig;
pub use directory::BoardDirectory;
pub use domain::{
    board::{Board, Column},
    card::Card,
    id::{BoardId, CardId, ColumnId},
};
pub use error::{ErrorKind, RemoteError, Result, SyncError};
pub use intent::{DragSession, Intent, PendingDelete};
pub use remote::RemoteStore;
pub use sync::{BoardSynchronizer, Operation};
