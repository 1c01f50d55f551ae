//! The set of boards known to the client and which one is current.

use crate::domain::{Board, BoardId, CardId, Column, ColumnId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Local collection of boards with a single current selection
///
/// Boards keep insertion order and are unique by ID. Whenever the
/// directory is non-empty a current ID is set.
#[derive(Debug, Clone, Default)]
pub struct BoardDirectory {
    boards: Vec<Board>,
    current: Option<BoardId>,
    synced_at: HashMap<BoardId, DateTime<Utc>>,
}

impl BoardDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from a fetched board list, selecting the first board
    pub fn from_boards(boards: Vec<Board>) -> Self {
        let mut directory = Self::new();
        directory.replace_all(boards);
        directory
    }

    pub fn list(&self) -> &[Board] {
        &self.boards
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn get(&self, id: &BoardId) -> Option<&Board> {
        self.boards.iter().find(|board| &board.id == id)
    }

    pub fn contains(&self, id: &BoardId) -> bool {
        self.get(id).is_some()
    }

    pub fn current_id(&self) -> Option<&BoardId> {
        self.current.as_ref()
    }

    /// The current board, or `None` when the selection names an unknown board
    pub fn current(&self) -> Option<&Board> {
        self.current.as_ref().and_then(|id| self.get(id))
    }

    /// Sets the current board. Unknown IDs are accepted as-is.
    pub fn select(&mut self, id: BoardId) {
        self.current = Some(id);
    }

    /// Replaces the board with the same ID in place, or appends it
    pub fn upsert_or_replace(&mut self, board: Board) {
        self.synced_at.insert(board.id.clone(), Utc::now());

        if self.current.is_none() {
            self.current = Some(board.id.clone());
        }

        match self.boards.iter_mut().find(|b| b.id == board.id) {
            Some(existing) => *existing = board,
            None => self.boards.push(board),
        }
    }

    /// Removes a board; a removed current board hands over to the first remaining one
    pub fn remove(&mut self, id: &BoardId) -> Option<Board> {
        let pos = self.boards.iter().position(|board| &board.id == id)?;
        let removed = self.boards.remove(pos);
        self.synced_at.remove(id);

        if self.current.as_ref() == Some(id) {
            self.current = self.boards.first().map(|board| board.id.clone());
        }

        Some(removed)
    }

    /// Replaces every board with a fresh listing
    ///
    /// The current selection survives if that board is still listed,
    /// otherwise the first board becomes current.
    pub fn replace_all(&mut self, boards: Vec<Board>) {
        let previous = self.current.take();
        self.boards.clear();
        self.synced_at.clear();

        for board in boards {
            self.upsert_or_replace(board);
        }

        self.current = match previous {
            Some(id) if self.contains(&id) => Some(id),
            _ => self.boards.first().map(|board| board.id.clone()),
        };
    }

    /// Overwrites only the title of a board, leaving its columns untouched
    pub fn patch_title(&mut self, id: &BoardId, title: String) -> bool {
        match self.boards.iter_mut().find(|board| &board.id == id) {
            Some(board) => {
                board.title = title;
                self.synced_at.insert(id.clone(), Utc::now());
                true
            }
            None => false,
        }
    }

    /// Appends a store-created column to the end of a board's column list
    pub fn append_column(&mut self, id: &BoardId, column: Column) -> bool {
        match self.boards.iter_mut().find(|board| &board.id == id) {
            Some(board) => {
                board.push_column(column);
                self.synced_at.insert(id.clone(), Utc::now());
                true
            }
            None => false,
        }
    }

    /// Finds the board whose tree holds the given column
    pub fn board_of_column(&self, id: &ColumnId) -> Option<&BoardId> {
        self.boards
            .iter()
            .find(|board| board.contains_column(id))
            .map(|board| &board.id)
    }

    /// Finds the board whose tree holds the given card
    pub fn board_of_card(&self, id: &CardId) -> Option<&BoardId> {
        self.boards
            .iter()
            .find(|board| board.contains_card(id))
            .map(|board| &board.id)
    }

    /// When the board was last committed from store data
    pub fn synced_at(&self, id: &BoardId) -> Option<DateTime<Utc>> {
        self.synced_at.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Card;
    use proptest::prelude::*;

    fn board(id: &str, title: &str) -> Board {
        Board::new(BoardId::from(id), title.to_string())
    }

    fn ids(directory: &BoardDirectory) -> Vec<&str> {
        directory.list().iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_from_boards_selects_first() {
        let directory =
            BoardDirectory::from_boards(vec![board("b1", "Sprint"), board("b2", "Roadmap")]);
        assert_eq!(directory.current_id().map(BoardId::as_str), Some("b1"));
        assert_eq!(directory.current().unwrap().title, "Sprint");
    }

    #[test]
    fn test_empty_directory_has_no_current() {
        let directory = BoardDirectory::from_boards(Vec::new());
        assert!(directory.is_empty());
        assert!(directory.current_id().is_none());
        assert!(directory.current().is_none());
    }

    #[test]
    fn test_select_unknown_is_tolerated() {
        let mut directory = BoardDirectory::from_boards(vec![board("b1", "Sprint")]);
        directory.select(BoardId::from("missing"));

        assert_eq!(directory.current_id().map(BoardId::as_str), Some("missing"));
        assert!(directory.current().is_none());
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut directory =
            BoardDirectory::from_boards(vec![board("b1", "Sprint"), board("b2", "Roadmap")]);
        directory.upsert_or_replace(board("b1", "Sprint 2"));

        assert_eq!(ids(&directory), vec!["b1", "b2"]);
        assert_eq!(directory.get(&BoardId::from("b1")).unwrap().title, "Sprint 2");
    }

    #[test]
    fn test_upsert_appends_and_stamps_sync_time() {
        let mut directory = BoardDirectory::from_boards(vec![board("b1", "Sprint")]);
        let before = Utc::now();
        directory.upsert_or_replace(board("b2", "Roadmap"));

        assert_eq!(ids(&directory), vec!["b1", "b2"]);
        assert_eq!(directory.current_id().map(BoardId::as_str), Some("b1"));
        assert!(directory.synced_at(&BoardId::from("b2")).unwrap() >= before);
    }

    #[test]
    fn test_upsert_into_empty_directory_selects_board() {
        let mut directory = BoardDirectory::new();
        directory.upsert_or_replace(board("b1", "Sprint"));
        assert_eq!(directory.current_id().map(BoardId::as_str), Some("b1"));
    }

    #[test]
    fn test_remove_current_moves_to_first_remaining() {
        let mut directory = BoardDirectory::from_boards(vec![
            board("b1", "Sprint"),
            board("b2", "Roadmap"),
            board("b3", "Ops"),
        ]);
        directory.select(BoardId::from("b2"));

        let removed = directory.remove(&BoardId::from("b2")).unwrap();
        assert_eq!(removed.title, "Roadmap");
        assert_eq!(directory.current_id().map(BoardId::as_str), Some("b1"));
        assert!(directory.synced_at(&BoardId::from("b2")).is_none());
    }

    #[test]
    fn test_remove_non_current_keeps_selection() {
        let mut directory =
            BoardDirectory::from_boards(vec![board("b1", "Sprint"), board("b2", "Roadmap")]);
        directory.select(BoardId::from("b2"));
        directory.remove(&BoardId::from("b1"));

        assert_eq!(directory.current_id().map(BoardId::as_str), Some("b2"));
    }

    #[test]
    fn test_remove_last_empties_directory() {
        let mut directory = BoardDirectory::from_boards(vec![board("b1", "Sprint")]);
        directory.remove(&BoardId::from("b1"));

        assert!(directory.is_empty());
        assert!(directory.current_id().is_none());
    }

    #[test]
    fn test_remove_unknown_is_none() {
        let mut directory = BoardDirectory::from_boards(vec![board("b1", "Sprint")]);
        assert!(directory.remove(&BoardId::from("b9")).is_none());
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_replace_all_keeps_surviving_selection() {
        let mut directory =
            BoardDirectory::from_boards(vec![board("b1", "Sprint"), board("b2", "Roadmap")]);
        directory.select(BoardId::from("b2"));

        directory.replace_all(vec![board("b3", "Ops"), board("b2", "Roadmap")]);
        assert_eq!(directory.current_id().map(BoardId::as_str), Some("b2"));

        directory.replace_all(vec![board("b4", "Hiring")]);
        assert_eq!(directory.current_id().map(BoardId::as_str), Some("b4"));
    }

    #[test]
    fn test_replace_all_dedups_by_id() {
        let directory = BoardDirectory::from_boards(vec![
            board("b1", "Sprint"),
            board("b1", "Sprint (dup)"),
        ]);
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.list()[0].title, "Sprint (dup)");
    }

    #[test]
    fn test_patch_title_keeps_columns() {
        let column = Column::new(ColumnId::from("c1"), "Todo".to_string());
        let mut directory =
            BoardDirectory::from_boards(vec![board("b1", "Sprint").with_column(column)]);

        assert!(directory.patch_title(&BoardId::from("b1"), "Sprint 5".to_string()));
        let patched = directory.get(&BoardId::from("b1")).unwrap();
        assert_eq!(patched.title, "Sprint 5");
        assert_eq!(patched.columns.len(), 1);

        assert!(!directory.patch_title(&BoardId::from("b9"), "Nope".to_string()));
    }

    #[test]
    fn test_owner_lookup() {
        let col = ColumnId::from("c1");
        let card = Card::new(CardId::from("k1"), col.clone(), "Spec".to_string());
        let directory = BoardDirectory::from_boards(vec![
            board("b1", "Sprint"),
            board("b2", "Roadmap")
                .with_column(Column::new(col.clone(), "Todo".to_string()).with_card(card)),
        ]);

        assert_eq!(directory.board_of_column(&col).map(BoardId::as_str), Some("b2"));
        assert_eq!(
            directory.board_of_card(&CardId::from("k1")).map(BoardId::as_str),
            Some("b2")
        );
        assert!(directory.board_of_column(&ColumnId::from("c9")).is_none());
    }

    #[derive(Debug, Clone)]
    enum DirectoryOp {
        Upsert(u8),
        Remove(u8),
        Select(u8),
        Replace(Vec<u8>),
    }

    fn directory_op() -> impl Strategy<Value = DirectoryOp> {
        prop_oneof![
            (0u8..6).prop_map(DirectoryOp::Upsert),
            (0u8..6).prop_map(DirectoryOp::Remove),
            (0u8..6).prop_map(DirectoryOp::Select),
            prop::collection::vec(0u8..6, 0..4).prop_map(DirectoryOp::Replace),
        ]
    }

    fn board_n(n: u8) -> Board {
        board(&format!("b{}", n), &format!("Board {}", n))
    }

    proptest! {
        #[test]
        fn prop_single_current_invariant(ops in prop::collection::vec(directory_op(), 0..40)) {
            let mut directory = BoardDirectory::new();

            for op in ops {
                match op {
                    DirectoryOp::Upsert(n) => directory.upsert_or_replace(board_n(n)),
                    DirectoryOp::Remove(n) => {
                        directory.remove(&board_n(n).id);
                    }
                    DirectoryOp::Select(n) => {
                        let id = board_n(n).id;
                        if directory.contains(&id) {
                            directory.select(id);
                        }
                    }
                    DirectoryOp::Replace(ns) => {
                        directory.replace_all(ns.into_iter().map(board_n).collect())
                    }
                }

                let unique: std::collections::HashSet<_> =
                    directory.list().iter().map(|b| b.id.clone()).collect();
                prop_assert_eq!(unique.len(), directory.len());

                if directory.is_empty() {
                    prop_assert!(directory.current_id().is_none());
                } else {
                    prop_assert!(directory.current().is_some());
                }
            }
        }
    }
}
