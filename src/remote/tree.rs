//! Store-side mutations over a list of board trees, shared by the bundled backends.

use crate::{
    domain::{Board, BoardId, Card, CardId, Column, ColumnId, EntityKind},
    error::RemoteError,
    remote::RemoteResult,
};
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn board_mut<'a>(boards: &'a mut [Board], id: &BoardId) -> RemoteResult<&'a mut Board> {
    boards
        .iter_mut()
        .find(|board| &board.id == id)
        .ok_or_else(|| RemoteError::not_found(EntityKind::Board, id))
}

fn column_mut<'a>(boards: &'a mut [Board], id: &ColumnId) -> RemoteResult<&'a mut Column> {
    boards
        .iter_mut()
        .flat_map(|board| board.columns.iter_mut())
        .find(|col| &col.id == id)
        .ok_or_else(|| RemoteError::not_found(EntityKind::Column, id))
}

fn card_mut<'a>(boards: &'a mut [Board], id: &CardId) -> RemoteResult<&'a mut Card> {
    boards
        .iter_mut()
        .flat_map(|board| board.columns.iter_mut())
        .flat_map(|col| col.cards.iter_mut())
        .find(|card| &card.id == id)
        .ok_or_else(|| RemoteError::not_found(EntityKind::Card, id))
}

pub(crate) fn create_board(boards: &mut Vec<Board>, title: &str) -> Board {
    let board = Board::new(BoardId::new(new_id()), title.to_string());
    boards.push(board.clone());
    board
}

pub(crate) fn update_board(boards: &mut [Board], id: &BoardId, title: &str) -> RemoteResult<Board> {
    let board = board_mut(boards, id)?;
    board.title = title.to_string();
    Ok(board.clone())
}

pub(crate) fn delete_board(boards: &mut Vec<Board>, id: &BoardId) -> RemoteResult<()> {
    let pos = boards
        .iter()
        .position(|board| &board.id == id)
        .ok_or_else(|| RemoteError::not_found(EntityKind::Board, id))?;
    boards.remove(pos);
    Ok(())
}

pub(crate) fn get_board(boards: &[Board], id: &BoardId) -> RemoteResult<Board> {
    boards
        .iter()
        .find(|board| &board.id == id)
        .cloned()
        .ok_or_else(|| RemoteError::not_found(EntityKind::Board, id))
}

pub(crate) fn create_column(
    boards: &mut [Board],
    board_id: &BoardId,
    title: &str,
) -> RemoteResult<Column> {
    let board = board_mut(boards, board_id)?;
    let column = Column::new(ColumnId::new(new_id()), title.to_string());
    board.columns.push(column.clone());
    Ok(column)
}

pub(crate) fn update_column(boards: &mut [Board], id: &ColumnId, title: &str) -> RemoteResult<()> {
    column_mut(boards, id)?.title = title.to_string();
    Ok(())
}

pub(crate) fn delete_column(boards: &mut [Board], id: &ColumnId) -> RemoteResult<()> {
    for board in boards.iter_mut() {
        if let Some(pos) = board.columns.iter().position(|col| &col.id == id) {
            board.columns.remove(pos);
            return Ok(());
        }
    }
    Err(RemoteError::not_found(EntityKind::Column, id))
}

pub(crate) fn create_card(
    boards: &mut [Board],
    column_id: &ColumnId,
    title: &str,
    description: &str,
) -> RemoteResult<Card> {
    let column = column_mut(boards, column_id)?;
    let card = Card::new(CardId::new(new_id()), column_id.clone(), title.to_string())
        .with_description(description);
    column.cards.push(card.clone());
    Ok(card)
}

pub(crate) fn update_card(
    boards: &mut [Board],
    id: &CardId,
    title: &str,
    description: &str,
) -> RemoteResult<()> {
    let card = card_mut(boards, id)?;
    card.title = title.to_string();
    card.description = description.to_string();
    Ok(())
}

pub(crate) fn delete_card(boards: &mut [Board], id: &CardId) -> RemoteResult<()> {
    for column in boards.iter_mut().flat_map(|board| board.columns.iter_mut()) {
        if let Some(pos) = column.cards.iter().position(|card| &card.id == id) {
            column.cards.remove(pos);
            return Ok(());
        }
    }
    Err(RemoteError::not_found(EntityKind::Card, id))
}

/// Moves a card to the end of the destination column
///
/// Both columns must belong to the same board and the card must currently
/// sit in the source column.
pub(crate) fn move_card(
    boards: &mut [Board],
    card_id: &CardId,
    source_column_id: &ColumnId,
    dest_column_id: &ColumnId,
) -> RemoteResult<()> {
    let board = boards
        .iter_mut()
        .find(|board| board.contains_column(source_column_id))
        .ok_or_else(|| RemoteError::not_found(EntityKind::Column, source_column_id))?;

    if !board.contains_column(dest_column_id) {
        return Err(RemoteError::not_found(EntityKind::Column, dest_column_id));
    }

    let source = board
        .columns
        .iter_mut()
        .find(|col| &col.id == source_column_id)
        .ok_or_else(|| RemoteError::not_found(EntityKind::Column, source_column_id))?;

    let pos = source
        .cards
        .iter()
        .position(|card| &card.id == card_id)
        .ok_or_else(|| {
            RemoteError::Rejected(format!(
                "card {} is not in column {}",
                card_id, source_column_id
            ))
        })?;

    if source_column_id == dest_column_id {
        return Ok(());
    }

    let mut card = source.cards.remove(pos);
    card.column_id = dest_column_id.clone();

    if let Some(dest) = board.columns.iter_mut().find(|col| &col.id == dest_column_id) {
        dest.cards.push(card);
    }

    Ok(())
}
