use std::fmt;

/// Named synchronizer operations, used in logs and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    LoadBoards,
    CreateBoard,
    RenameBoard,
    DeleteBoard,
    CreateColumn,
    RenameColumn,
    DeleteColumn,
    CreateCard,
    UpdateCard,
    DeleteCard,
    MoveCard,
    Reconcile,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadBoards => "load_boards",
            Self::CreateBoard => "create_board",
            Self::RenameBoard => "rename_board",
            Self::DeleteBoard => "delete_board",
            Self::CreateColumn => "create_column",
            Self::RenameColumn => "rename_column",
            Self::DeleteColumn => "delete_column",
            Self::CreateCard => "create_card",
            Self::UpdateCard => "update_card",
            Self::DeleteCard => "delete_card",
            Self::MoveCard => "move_card",
            Self::Reconcile => "reconcile",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
