//! Board synchronizer: runs every mutation against the remote store and
//! reconciles the local [`BoardDirectory`] afterwards.
//!
//! Two reconciliation strategies are used:
//!
//! - **append-result**: board and column creation append the entity the
//!   store returned, since no sibling data can have changed.
//! - **full reload**: every other mutation re-fetches the owning board with
//!   [`BoardSynchronizer::reconcile`] and replaces the local tree wholesale.
//!
//! Local state is only touched after the store confirmed the mutation, so a
//! failure at any step leaves the directory exactly as it was.

mod operation;
mod queue;

pub use operation::Operation;
pub use queue::BoardLocks;

use crate::{
    config::SyncConfig,
    directory::BoardDirectory,
    domain::{validate_title, Board, BoardId, CardId, Column, ColumnId},
    error::{RemoteError, Result, SyncError},
    intent::{DeleteTarget, Intent},
    remote::RemoteStore,
};
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard, RwLock, RwLockReadGuard};

fn remote(operation: Operation) -> impl FnOnce(RemoteError) -> SyncError {
    move |source| SyncError::Remote { operation, source }
}

/// Keeps a [`BoardDirectory`] in step with a [`RemoteStore`]
pub struct BoardSynchronizer<S> {
    store: S,
    directory: RwLock<BoardDirectory>,
    locks: BoardLocks,
    board_set: Mutex<()>,
    config: SyncConfig,
}

impl<S: RemoteStore> BoardSynchronizer<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, SyncConfig::default())
    }

    pub fn with_config(store: S, config: SyncConfig) -> Self {
        Self {
            store,
            directory: RwLock::new(BoardDirectory::new()),
            locks: BoardLocks::new(),
            board_set: Mutex::new(()),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Read access to the committed local state
    pub async fn directory(&self) -> RwLockReadGuard<'_, BoardDirectory> {
        self.directory.read().await
    }

    pub async fn current_board(&self) -> Option<Board> {
        self.directory.read().await.current().cloned()
    }

    pub async fn select(&self, id: BoardId) {
        self.directory.write().await.select(id);
    }

    // =========================================================================
    // Locking
    // =========================================================================

    async fn board_guard(&self, board_id: &BoardId) -> Option<OwnedMutexGuard<()>> {
        if self.config.serialize_per_board {
            Some(self.locks.acquire(board_id).await)
        } else {
            None
        }
    }

    async fn board_set_guard(&self) -> Option<MutexGuard<'_, ()>> {
        if self.config.serialize_per_board {
            Some(self.board_set.lock().await)
        } else {
            None
        }
    }

    // =========================================================================
    // Lookup and reporting
    // =========================================================================

    async fn require_board(&self, id: &BoardId) -> Result<()> {
        if self.directory.read().await.contains(id) {
            Ok(())
        } else {
            Err(SyncError::BoardNotFound(id.clone()))
        }
    }

    async fn current_board_id(&self) -> Result<BoardId> {
        self.directory
            .read()
            .await
            .current_id()
            .cloned()
            .ok_or(SyncError::NoCurrentBoard)
    }

    async fn owner_of_column(&self, id: &ColumnId) -> Result<BoardId> {
        self.directory
            .read()
            .await
            .board_of_column(id)
            .cloned()
            .ok_or_else(|| SyncError::ColumnNotFound(id.clone()))
    }

    async fn owner_of_card(&self, id: &CardId) -> Result<BoardId> {
        self.directory
            .read()
            .await
            .board_of_card(id)
            .cloned()
            .ok_or_else(|| SyncError::CardNotFound(id.clone()))
    }

    /// Logs a failed operation; the result is passed through unchanged
    fn report<T>(&self, operation: Operation, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_local() {
                tracing::warn!(operation = %operation, "{}", err);
            } else {
                tracing::error!(operation = %operation, error = %err, "operation failed");
            }
        }
        result
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Fetches a board and commits it, replacing the local tree wholesale
    async fn reload(&self, operation: Operation, board_id: &BoardId) -> Result<Board> {
        let board = self
            .store
            .get_board(board_id)
            .await
            .map_err(remote(operation))?;

        if &board.id != board_id {
            return Err(SyncError::InconsistentBoard {
                board: board_id.clone(),
                reason: format!("store answered with board {}", board.id),
            });
        }

        if self.config.verify_reloaded_boards {
            board.check_consistency()?;
        }

        tracing::debug!(
            operation = %operation,
            board_id = %board.id,
            columns = board.columns.len(),
            cards = board.card_count(),
            "board reconciled"
        );

        self.directory.write().await.upsert_or_replace(board.clone());
        Ok(board)
    }

    /// Re-derives a board from the store and replaces the local copy
    pub async fn reconcile(&self, board_id: &BoardId) -> Result<Board> {
        let result: Result<Board> = async {
            let _guard = self.board_guard(board_id).await;
            self.reload(Operation::Reconcile, board_id).await
        }
        .await;
        self.report(Operation::Reconcile, result)
    }

    // =========================================================================
    // Boards
    // =========================================================================

    /// Replaces the directory with the store's full board listing
    pub async fn load_boards(&self) -> Result<()> {
        let result: Result<()> = async {
            let _set = self.board_set_guard().await;

            let boards = self
                .store
                .list_boards()
                .await
                .map_err(remote(Operation::LoadBoards))?;

            if self.config.verify_reloaded_boards {
                for board in &boards {
                    board.check_consistency()?;
                }
            }

            let mut directory = self.directory.write().await;
            directory.replace_all(boards);
            tracing::info!(boards = directory.len(), "boards loaded");
            Ok(())
        }
        .await;
        self.report(Operation::LoadBoards, result)
    }

    pub async fn create_board(&self, title: &str) -> Result<Board> {
        let result: Result<Board> = async {
            let title = validate_title(title)?;
            let _set = self.board_set_guard().await;

            let board = self
                .store
                .create_board(&title)
                .await
                .map_err(remote(Operation::CreateBoard))?;

            let mut directory = self.directory.write().await;
            directory.upsert_or_replace(board.clone());
            if self.config.select_created_board {
                directory.select(board.id.clone());
            }

            tracing::info!(board_id = %board.id, title = %board.title, "board created");
            Ok(board)
        }
        .await;
        self.report(Operation::CreateBoard, result)
    }

    /// Renames a board and patches only its title locally
    pub async fn rename_board(&self, id: &BoardId, title: &str) -> Result<()> {
        let result: Result<()> = async {
            let title = validate_title(title)?;
            self.require_board(id).await?;
            let _guard = self.board_guard(id).await;

            let echoed = self
                .store
                .update_board(id, &title)
                .await
                .map_err(remote(Operation::RenameBoard))?;

            let title = match echoed {
                Some(board) if &board.id == id => board.title,
                _ => title,
            };
            self.directory.write().await.patch_title(id, title);
            Ok(())
        }
        .await;
        self.report(Operation::RenameBoard, result)
    }

    pub async fn rename_current_board(&self, title: &str) -> Result<()> {
        let id = self.current_board_id().await;
        let id = self.report(Operation::RenameBoard, id)?;
        self.rename_board(&id, title).await
    }

    /// Deletes a board; the last remaining board can never be deleted
    pub async fn delete_board(&self, id: &BoardId) -> Result<()> {
        let result: Result<()> = async {
            let _set = self.board_set_guard().await;
            {
                let directory = self.directory.read().await;
                if directory.len() < 2 {
                    return Err(SyncError::LastBoard);
                }
                if !directory.contains(id) {
                    return Err(SyncError::BoardNotFound(id.clone()));
                }
            }

            let guard = self.board_guard(id).await;

            self.store
                .delete_board(id)
                .await
                .map_err(remote(Operation::DeleteBoard))?;

            self.directory.write().await.remove(id);
            drop(guard);
            self.locks.forget(id).await;

            tracing::info!(board_id = %id, "board deleted");
            Ok(())
        }
        .await;
        self.report(Operation::DeleteBoard, result)
    }

    pub async fn delete_current_board(&self) -> Result<()> {
        let id = self.current_board_id().await;
        let id = self.report(Operation::DeleteBoard, id)?;
        self.delete_board(&id).await
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Creates a column and appends the store's result to the end of the board
    pub async fn create_column(&self, board_id: &BoardId, title: &str) -> Result<Column> {
        let result: Result<Column> = async {
            let title = validate_title(title)?;
            self.require_board(board_id).await?;
            let _guard = self.board_guard(board_id).await;

            let column = self
                .store
                .create_column(board_id, &title)
                .await
                .map_err(remote(Operation::CreateColumn))?;

            if !self
                .directory
                .write()
                .await
                .append_column(board_id, column.clone())
            {
                return Err(SyncError::BoardNotFound(board_id.clone()));
            }
            Ok(column)
        }
        .await;
        self.report(Operation::CreateColumn, result)
    }

    pub async fn rename_column(&self, id: &ColumnId, title: &str) -> Result<()> {
        let result: Result<()> = async {
            let title = validate_title(title)?;
            let board_id = self.owner_of_column(id).await?;
            let _guard = self.board_guard(&board_id).await;

            self.store
                .update_column(id, &title)
                .await
                .map_err(remote(Operation::RenameColumn))?;
            self.reload(Operation::RenameColumn, &board_id).await?;
            Ok(())
        }
        .await;
        self.report(Operation::RenameColumn, result)
    }

    /// Deletes a column and its cards. Callers obtain confirmation first.
    pub async fn delete_column(&self, id: &ColumnId) -> Result<()> {
        let result: Result<()> = async {
            let board_id = self.owner_of_column(id).await?;
            let _guard = self.board_guard(&board_id).await;

            self.store
                .delete_column(id)
                .await
                .map_err(remote(Operation::DeleteColumn))?;
            self.reload(Operation::DeleteColumn, &board_id).await?;
            Ok(())
        }
        .await;
        self.report(Operation::DeleteColumn, result)
    }

    // =========================================================================
    // Cards
    // =========================================================================

    pub async fn create_card(
        &self,
        column_id: &ColumnId,
        title: &str,
        description: &str,
    ) -> Result<()> {
        let result: Result<()> = async {
            let title = validate_title(title)?;
            let board_id = self.owner_of_column(column_id).await?;
            let _guard = self.board_guard(&board_id).await;

            self.store
                .create_card(column_id, &title, description)
                .await
                .map_err(remote(Operation::CreateCard))?;
            self.reload(Operation::CreateCard, &board_id).await?;
            Ok(())
        }
        .await;
        self.report(Operation::CreateCard, result)
    }

    pub async fn update_card(&self, id: &CardId, title: &str, description: &str) -> Result<()> {
        let result: Result<()> = async {
            let title = validate_title(title)?;
            let board_id = self.owner_of_card(id).await?;
            let _guard = self.board_guard(&board_id).await;

            self.store
                .update_card(id, &title, description)
                .await
                .map_err(remote(Operation::UpdateCard))?;
            self.reload(Operation::UpdateCard, &board_id).await?;
            Ok(())
        }
        .await;
        self.report(Operation::UpdateCard, result)
    }

    pub async fn delete_card(&self, id: &CardId) -> Result<()> {
        let result: Result<()> = async {
            let board_id = self.owner_of_card(id).await?;
            let _guard = self.board_guard(&board_id).await;

            self.store
                .delete_card(id)
                .await
                .map_err(remote(Operation::DeleteCard))?;
            self.reload(Operation::DeleteCard, &board_id).await?;
            Ok(())
        }
        .await;
        self.report(Operation::DeleteCard, result)
    }

    pub async fn move_card(
        &self,
        card_id: &CardId,
        source_column_id: &ColumnId,
        dest_column_id: &ColumnId,
    ) -> Result<()> {
        let result: Result<()> = async {
            let board_id = self.owner_of_column(source_column_id).await?;
            {
                let directory = self.directory.read().await;
                let board = directory
                    .get(&board_id)
                    .ok_or_else(|| SyncError::BoardNotFound(board_id.clone()))?;
                if !board.contains_column(dest_column_id) {
                    return Err(SyncError::ColumnNotFound(dest_column_id.clone()));
                }
                let in_source = board
                    .column(source_column_id)
                    .is_some_and(|column| column.contains_card(card_id));
                if !in_source {
                    return Err(SyncError::CardNotFound(card_id.clone()));
                }
            }
            let _guard = self.board_guard(&board_id).await;

            self.store
                .move_card(card_id, source_column_id, dest_column_id)
                .await
                .map_err(remote(Operation::MoveCard))?;
            self.reload(Operation::MoveCard, &board_id).await?;
            Ok(())
        }
        .await;
        self.report(Operation::MoveCard, result)
    }

    // =========================================================================
    // Intents
    // =========================================================================

    /// Runs a UI intent against the matching operation
    pub async fn dispatch(&self, intent: Intent) -> Result<()> {
        match intent {
            Intent::SelectBoard(id) => {
                self.select(id).await;
                Ok(())
            }
            Intent::CreateBoard { title } => self.create_board(&title).await.map(|_| ()),
            Intent::RenameBoard { board_id, title } => self.rename_board(&board_id, &title).await,
            Intent::CreateColumn { board_id, title } => {
                self.create_column(&board_id, &title).await.map(|_| ())
            }
            Intent::RenameColumn { column_id, title } => {
                self.rename_column(&column_id, &title).await
            }
            Intent::CreateCard {
                column_id,
                title,
                description,
            } => self.create_card(&column_id, &title, &description).await,
            Intent::UpdateCard {
                card_id,
                title,
                description,
            } => self.update_card(&card_id, &title, &description).await,
            Intent::MoveCard {
                card_id,
                source_column_id,
                dest_column_id,
            } => {
                self.move_card(&card_id, &source_column_id, &dest_column_id)
                    .await
            }
            Intent::Delete(confirmed) => match confirmed.into_target() {
                DeleteTarget::Board(id) => self.delete_board(&id).await,
                DeleteTarget::Column(id) => self.delete_column(&id).await,
                DeleteTarget::Card(id) => self.delete_card(&id).await,
            },
        }
    }
}
