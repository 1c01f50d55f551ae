//! Presentation-facing intents: what a UI asks the synchronizer to do.
//!
//! Destructive intents can only be built through [`PendingDelete::confirm`],
//! and card moves are composed from a drag pick-up and drop with
//! [`DragSession`].

use crate::domain::{BoardId, CardId, ColumnId};

/// Entity a delete request points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Board(BoardId),
    Column(ColumnId),
    Card(CardId),
}

/// A delete the user has explicitly confirmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedDelete(DeleteTarget);

impl ConfirmedDelete {
    pub fn target(&self) -> &DeleteTarget {
        &self.0
    }

    pub fn into_target(self) -> DeleteTarget {
        self.0
    }
}

/// A delete awaiting the user's confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    target: DeleteTarget,
}

impl PendingDelete {
    pub fn request(target: DeleteTarget) -> Self {
        Self { target }
    }

    pub fn board(id: BoardId) -> Self {
        Self::request(DeleteTarget::Board(id))
    }

    pub fn column(id: ColumnId) -> Self {
        Self::request(DeleteTarget::Column(id))
    }

    pub fn card(id: CardId) -> Self {
        Self::request(DeleteTarget::Card(id))
    }

    pub fn target(&self) -> &DeleteTarget {
        &self.target
    }

    pub fn confirm(self) -> Intent {
        Intent::Delete(ConfirmedDelete(self.target))
    }

    /// Abandons the request; nothing reaches the synchronizer
    pub fn cancel(self) {}
}

/// One user-triggered operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SelectBoard(BoardId),
    CreateBoard {
        title: String,
    },
    RenameBoard {
        board_id: BoardId,
        title: String,
    },
    CreateColumn {
        board_id: BoardId,
        title: String,
    },
    RenameColumn {
        column_id: ColumnId,
        title: String,
    },
    CreateCard {
        column_id: ColumnId,
        title: String,
        description: String,
    },
    UpdateCard {
        card_id: CardId,
        title: String,
        description: String,
    },
    MoveCard {
        card_id: CardId,
        source_column_id: ColumnId,
        dest_column_id: ColumnId,
    },
    Delete(ConfirmedDelete),
}

/// Tracks a card drag from pick-up to drop
#[derive(Debug, Default, Clone)]
pub struct DragSession {
    picked: Option<(CardId, ColumnId)>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the dragged card and the column it was lifted from
    pub fn pick_up(&mut self, card_id: CardId, source_column_id: ColumnId) {
        self.picked = Some((card_id, source_column_id));
    }

    pub fn is_dragging(&self) -> bool {
        self.picked.is_some()
    }

    pub fn cancel(&mut self) {
        self.picked = None;
    }

    /// Ends the drag over a column
    ///
    /// Returns a move intent, or `None` when nothing was picked up or the
    /// card was dropped back onto its own column.
    pub fn drop_on(&mut self, dest_column_id: ColumnId) -> Option<Intent> {
        let (card_id, source_column_id) = self.picked.take()?;

        if source_column_id == dest_column_id {
            return None;
        }

        Some(Intent::MoveCard {
            card_id,
            source_column_id,
            dest_column_id,
        })
    }
}
