use crate::domain::id::{CardId, ColumnId};
use serde::{Deserialize, Serialize};

/// A unit of work belonging to exactly one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub column_id: ColumnId,
}

impl Card {
    pub fn new(id: CardId, column_id: ColumnId, title: String) -> Self {
        Self {
            id,
            title,
            description: String::new(),
            column_id,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
