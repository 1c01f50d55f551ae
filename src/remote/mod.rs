use crate::{
    domain::{Board, BoardId, Card, CardId, Column, ColumnId},
    error::RemoteError,
};
use async_trait::async_trait;

#[cfg(feature = "file-store")]
pub mod file_store;
pub mod memory;
mod tree;

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Authoritative store the synchronizer mutates and reloads from
///
/// Every call is a single request/response exchange keyed by entity IDs.
/// Deletes cascade to children on the store side.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Lists all boards as full trees
    async fn list_boards(&self) -> RemoteResult<Vec<Board>>;

    /// Creates a board with no columns
    async fn create_board(&self, title: &str) -> RemoteResult<Board>;

    /// Renames a board. Stores may echo the updated board back.
    async fn update_board(&self, id: &BoardId, title: &str) -> RemoteResult<Option<Board>>;

    /// Deletes a board with all its columns and cards
    async fn delete_board(&self, id: &BoardId) -> RemoteResult<()>;

    /// Loads one board as a full tree
    async fn get_board(&self, id: &BoardId) -> RemoteResult<Board>;

    async fn create_column(&self, board_id: &BoardId, title: &str) -> RemoteResult<Column>;

    async fn update_column(&self, id: &ColumnId, title: &str) -> RemoteResult<()>;

    /// Deletes a column with all its cards
    async fn delete_column(&self, id: &ColumnId) -> RemoteResult<()>;

    async fn create_card(
        &self,
        column_id: &ColumnId,
        title: &str,
        description: &str,
    ) -> RemoteResult<Card>;

    async fn update_card(&self, id: &CardId, title: &str, description: &str) -> RemoteResult<()>;

    async fn delete_card(&self, id: &CardId) -> RemoteResult<()>;

    /// Reassigns a card from one column to another
    async fn move_card(
        &self,
        card_id: &CardId,
        source_column_id: &ColumnId,
        dest_column_id: &ColumnId,
    ) -> RemoteResult<()>;
}
