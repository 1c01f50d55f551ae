pub mod board;
pub mod card;
pub mod id;
pub mod title;

use std::fmt;

pub use board::{Board, Column};
pub use card::Card;
pub use id::{BoardId, CardId, ColumnId};
pub use title::validate_title;

/// The three entity kinds held in a board tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Board,
    Column,
    Card,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board => write!(f, "Board"),
            Self::Column => write!(f, "Column"),
            Self::Card => write!(f, "Card"),
        }
    }
}
