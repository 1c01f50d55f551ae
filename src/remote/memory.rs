use crate::{
    domain::{Board, BoardId, Card, CardId, Column, ColumnId},
    error::RemoteError,
    remote::{tree, RemoteResult, RemoteStore},
};
use async_trait::async_trait;
use std::fmt;
use tokio::sync::Mutex;

/// Identifies one [`RemoteStore`] method, for call logs and fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreCall {
    ListBoards,
    CreateBoard,
    UpdateBoard,
    DeleteBoard,
    GetBoard,
    CreateColumn,
    UpdateColumn,
    DeleteColumn,
    CreateCard,
    UpdateCard,
    DeleteCard,
    MoveCard,
}

impl fmt::Display for StoreCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ListBoards => "listBoards",
            Self::CreateBoard => "createBoard",
            Self::UpdateBoard => "updateBoard",
            Self::DeleteBoard => "deleteBoard",
            Self::GetBoard => "getBoard",
            Self::CreateColumn => "createColumn",
            Self::UpdateColumn => "updateColumn",
            Self::DeleteColumn => "deleteColumn",
            Self::CreateCard => "createCard",
            Self::UpdateCard => "updateCard",
            Self::DeleteCard => "deleteCard",
            Self::MoveCard => "moveCard",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Default)]
struct State {
    boards: Vec<Board>,
    calls: Vec<StoreCall>,
    failures: Vec<StoreCall>,
}

impl State {
    /// Records the call and consumes a pending injected failure, if any
    fn enter(&mut self, call: StoreCall) -> RemoteResult<()> {
        self.calls.push(call);
        if let Some(pos) = self.failures.iter().position(|c| *c == call) {
            self.failures.remove(pos);
            return Err(RemoteError::Unavailable(format!("injected failure on {}", call)));
        }
        Ok(())
    }
}

/// In-process store with server semantics
///
/// Assigns UUID identifiers, cascades deletes and keeps a log of every call.
/// Failures can be queued per call kind to exercise error paths.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded with the given boards
    pub fn with_boards(boards: Vec<Board>) -> Self {
        Self {
            state: Mutex::new(State {
                boards,
                ..State::default()
            }),
        }
    }

    /// Makes the next call of the given kind fail with [`RemoteError::Unavailable`]
    pub async fn fail_next(&self, call: StoreCall) {
        self.state.lock().await.failures.push(call);
    }

    /// Every call received so far, in order
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn call_count(&self, call: StoreCall) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| **c == call)
            .count()
    }

    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Edits store data directly, bypassing the call log
    pub async fn edit<F>(&self, f: F)
    where
        F: FnOnce(&mut Vec<Board>),
    {
        f(&mut self.state.lock().await.boards);
    }

    pub async fn snapshot(&self) -> Vec<Board> {
        self.state.lock().await.boards.clone()
    }
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn list_boards(&self) -> RemoteResult<Vec<Board>> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::ListBoards)?;
        Ok(state.boards.clone())
    }

    async fn create_board(&self, title: &str) -> RemoteResult<Board> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::CreateBoard)?;
        Ok(tree::create_board(&mut state.boards, title))
    }

    async fn update_board(&self, id: &BoardId, title: &str) -> RemoteResult<Option<Board>> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::UpdateBoard)?;
        tree::update_board(&mut state.boards, id, title).map(Some)
    }

    async fn delete_board(&self, id: &BoardId) -> RemoteResult<()> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::DeleteBoard)?;
        tree::delete_board(&mut state.boards, id)
    }

    async fn get_board(&self, id: &BoardId) -> RemoteResult<Board> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::GetBoard)?;
        tree::get_board(&state.boards, id)
    }

    async fn create_column(&self, board_id: &BoardId, title: &str) -> RemoteResult<Column> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::CreateColumn)?;
        tree::create_column(&mut state.boards, board_id, title)
    }

    async fn update_column(&self, id: &ColumnId, title: &str) -> RemoteResult<()> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::UpdateColumn)?;
        tree::update_column(&mut state.boards, id, title)
    }

    async fn delete_column(&self, id: &ColumnId) -> RemoteResult<()> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::DeleteColumn)?;
        tree::delete_column(&mut state.boards, id)
    }

    async fn create_card(
        &self,
        column_id: &ColumnId,
        title: &str,
        description: &str,
    ) -> RemoteResult<Card> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::CreateCard)?;
        tree::create_card(&mut state.boards, column_id, title, description)
    }

    async fn update_card(&self, id: &CardId, title: &str, description: &str) -> RemoteResult<()> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::UpdateCard)?;
        tree::update_card(&mut state.boards, id, title, description)
    }

    async fn delete_card(&self, id: &CardId) -> RemoteResult<()> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::DeleteCard)?;
        tree::delete_card(&mut state.boards, id)
    }

    async fn move_card(
        &self,
        card_id: &CardId,
        source_column_id: &ColumnId,
        dest_column_id: &ColumnId,
    ) -> RemoteResult<()> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::MoveCard)?;
        tree::move_card(&mut state.boards, card_id, source_column_id, dest_column_id)
    }
}
