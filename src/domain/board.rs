use crate::domain::card::Card;
use crate::domain::id::{BoardId, CardId, ColumnId};
use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An ordered lane of cards within a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Column {
    pub fn new(id: ColumnId, title: String) -> Self {
        Self {
            id,
            title,
            cards: Vec::new(),
        }
    }

    pub fn with_card(mut self, card: Card) -> Self {
        self.cards.push(card);
        self
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.cards.iter().find(|card| &card.id == id)
    }

    pub fn contains_card(&self, id: &CardId) -> bool {
        self.card(id).is_some()
    }
}

/// Kanban board as last fetched from the store
///
/// The column order is whatever the store returned; it is never
/// rearranged locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Board {
    pub fn new(id: BoardId, title: String) -> Self {
        Self {
            id,
            title,
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Gets a column by ID
    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|col| &col.id == id)
    }

    pub fn contains_column(&self, id: &ColumnId) -> bool {
        self.column(id).is_some()
    }

    /// Gets a card together with the column currently holding it
    pub fn card(&self, id: &CardId) -> Option<(&Column, &Card)> {
        self.columns
            .iter()
            .find_map(|col| col.card(id).map(|card| (col, card)))
    }

    pub fn contains_card(&self, id: &CardId) -> bool {
        self.card(id).is_some()
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|col| col.cards.len()).sum()
    }

    /// Appends a column the store has already created
    pub fn push_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Checks the structural invariants of a fetched tree
    ///
    /// Column IDs are unique, every card sits in the column named by its
    /// `column_id`, and no card appears twice.
    pub fn check_consistency(&self) -> Result<()> {
        let mut column_ids = HashSet::new();
        let mut card_ids = HashSet::new();

        for column in &self.columns {
            if !column_ids.insert(&column.id) {
                return Err(self.inconsistent(format!("column {} appears twice", column.id)));
            }

            for card in &column.cards {
                if card.column_id != column.id {
                    return Err(self.inconsistent(format!(
                        "card {} claims column {} but sits in column {}",
                        card.id, card.column_id, column.id
                    )));
                }
                if !card_ids.insert(&card.id) {
                    return Err(self.inconsistent(format!("card {} appears twice", card.id)));
                }
            }
        }

        Ok(())
    }

    fn inconsistent(&self, reason: String) -> SyncError {
        SyncError::InconsistentBoard {
            board: self.id.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_board() -> Board {
        let todo = ColumnId::from("c1");
        let done = ColumnId::from("c2");
        Board::new(BoardId::from("b1"), "Sprint".to_string())
            .with_column(
                Column::new(todo.clone(), "Todo".to_string())
                    .with_card(Card::new(CardId::from("k1"), todo.clone(), "Spec".to_string()))
                    .with_card(Card::new(CardId::from("k2"), todo, "Build".to_string())),
            )
            .with_column(
                Column::new(done.clone(), "Done".to_string())
                    .with_card(Card::new(CardId::from("k3"), done, "Setup".to_string())),
            )
    }

    #[test]
    fn test_board_creation() {
        let board = Board::new(BoardId::from("b2"), "Roadmap".to_string());
        assert!(board.columns.is_empty());
        assert_eq!(board.card_count(), 0);
    }

    #[test]
    fn test_lookup() {
        let board = sample_board();

        assert!(board.contains_column(&ColumnId::from("c2")));
        assert!(!board.contains_column(&ColumnId::from("c9")));

        let (column, card) = board.card(&CardId::from("k3")).unwrap();
        assert_eq!(column.id.as_str(), "c2");
        assert_eq!(card.title, "Setup");
        assert_eq!(board.card_count(), 3);
    }

    #[test]
    fn test_push_column_appends_at_end() {
        let mut board = sample_board();
        board.push_column(Column::new(ColumnId::from("c3"), "Review".to_string()));

        let last = board.columns.last().unwrap();
        assert_eq!(last.id.as_str(), "c3");
        assert_eq!(board.columns.len(), 3);
    }

    #[test]
    fn test_consistent_board_passes() {
        assert!(sample_board().check_consistency().is_ok());
    }

    #[test]
    fn test_misplaced_card_is_inconsistent() {
        let mut board = sample_board();
        board.columns[1].cards[0].column_id = ColumnId::from("c1");

        let err = board.check_consistency().unwrap_err();
        assert!(matches!(err, SyncError::InconsistentBoard { .. }));
    }

    #[test]
    fn test_duplicate_card_is_inconsistent() {
        let mut board = sample_board();
        let dup = Card::new(CardId::from("k1"), ColumnId::from("c2"), "Spec".to_string());
        board.columns[1].cards.push(dup);

        assert!(board.check_consistency().is_err());
    }

    #[test]
    fn test_board_deserializes_without_columns() {
        let board: Board = serde_json::from_str(r#"{"id":"b2","title":"Roadmap"}"#).unwrap();
        assert!(board.columns.is_empty());
    }
}
