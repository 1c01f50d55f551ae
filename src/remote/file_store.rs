use crate::{
    domain::{Board, BoardId, Card, CardId, Column, ColumnId, EntityKind},
    error::RemoteError,
    remote::{tree, RemoteResult, RemoteStore},
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::RwLock};

/// File-based store keeping one JSON document per board
///
/// Board order is kept in a separate index file. Mutations hold the write
/// side of a lock and reads the read side, so a read never observes a call
/// in progress. Files are replaced through a temporary file and a rename.
pub struct FileStore {
    root_path: PathBuf,
    lock: RwLock<()>,
}

impl FileStore {
    const DATA_DIR: &'static str = ".kanban";
    const BOARDS_DIR: &'static str = "boards";
    const INDEX_FILE: &'static str = "index.json";

    /// Creates a new FileStore for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::DATA_DIR),
            lock: RwLock::new(()),
        }
    }

    fn boards_dir(&self) -> PathBuf {
        self.root_path.join(Self::BOARDS_DIR)
    }

    fn index_file(&self) -> PathBuf {
        self.root_path.join(Self::INDEX_FILE)
    }

    /// Path of a board's document; IDs that could escape the boards directory are rejected
    fn board_file(&self, id: &BoardId) -> RemoteResult<PathBuf> {
        let raw = id.as_str();
        if raw.is_empty() || raw.contains(['/', '\\']) || raw.contains("..") {
            return Err(RemoteError::Rejected(format!("invalid board id: {}", raw)));
        }
        Ok(self.boards_dir().join(format!("{}.json", raw)))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> RemoteResult<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    /// Replaces a file in one step so readers see either the old or the new contents
    async fn write_atomic(&self, path: &Path, contents: String) -> RemoteResult<()> {
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, contents).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Creates the data directory and an empty index
    pub async fn initialize(&self) -> RemoteResult<()> {
        let _guard = self.lock.write().await;
        self.ensure_directory_exists(&self.boards_dir()).await?;

        if !self.index_file().exists() {
            self.save_index(&[]).await?;
        }

        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.boards_dir().exists() && self.index_file().exists()
    }

    async fn load_index(&self) -> RemoteResult<Vec<BoardId>> {
        let index_file = self.index_file();

        if !index_file.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&index_file).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    async fn save_index(&self, boards: &[Board]) -> RemoteResult<()> {
        let ids: Vec<&BoardId> = boards.iter().map(|board| &board.id).collect();
        let json = serde_json::to_string_pretty(&ids)?;
        self.write_atomic(&self.index_file(), json).await
    }

    async fn load_board(&self, id: &BoardId) -> RemoteResult<Board> {
        let file_path = self.board_file(id)?;

        if !file_path.exists() {
            return Err(RemoteError::not_found(EntityKind::Board, id));
        }

        let contents = fs::read_to_string(&file_path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    async fn load_all(&self) -> RemoteResult<Vec<Board>> {
        let mut boards = Vec::new();
        for id in self.load_index().await? {
            boards.push(self.load_board(&id).await?);
        }
        Ok(boards)
    }

    /// Writes the boards that differ from `before`, removes deleted ones and
    /// rewrites the index only when the board list changed
    async fn save_changes(&self, before: &[Board], boards: &[Board]) -> RemoteResult<()> {
        self.ensure_directory_exists(&self.boards_dir()).await?;

        let previous: HashMap<&BoardId, &Board> =
            before.iter().map(|board| (&board.id, board)).collect();

        for board in boards {
            if previous.get(&board.id) != Some(&board) {
                let json = serde_json::to_string_pretty(board)?;
                self.write_atomic(&self.board_file(&board.id)?, json).await?;
            }
        }

        let order_changed = before.len() != boards.len()
            || before.iter().zip(boards).any(|(old, new)| old.id != new.id);
        if order_changed {
            self.save_index(boards).await?;
        }

        for old in before {
            if !boards.iter().any(|board| board.id == old.id) {
                let file_path = self.board_file(&old.id)?;
                if file_path.exists() {
                    fs::remove_file(file_path).await?;
                }
            }
        }

        Ok(())
    }

    /// Loads every board, applies `f` and persists what changed
    ///
    /// Nothing is written when `f` fails.
    async fn mutate<T, F>(&self, f: F) -> RemoteResult<T>
    where
        T: Send,
        F: FnOnce(&mut Vec<Board>) -> RemoteResult<T> + Send,
    {
        let _guard = self.lock.write().await;

        let before = self.load_all().await?;
        let mut boards = before.clone();

        let result = f(&mut boards)?;
        for board in &boards {
            self.board_file(&board.id)?;
        }
        self.save_changes(&before, &boards).await?;

        Ok(result)
    }
}

#[async_trait]
impl RemoteStore for FileStore {
    async fn list_boards(&self) -> RemoteResult<Vec<Board>> {
        let _guard = self.lock.read().await;
        self.load_all().await
    }

    async fn create_board(&self, title: &str) -> RemoteResult<Board> {
        self.mutate(|boards| Ok(tree::create_board(boards, title)))
            .await
    }

    async fn update_board(&self, id: &BoardId, title: &str) -> RemoteResult<Option<Board>> {
        self.mutate(|boards| tree::update_board(boards, id, title))
            .await
            .map(Some)
    }

    async fn delete_board(&self, id: &BoardId) -> RemoteResult<()> {
        self.mutate(|boards| tree::delete_board(boards, id)).await
    }

    async fn get_board(&self, id: &BoardId) -> RemoteResult<Board> {
        let _guard = self.lock.read().await;
        self.load_board(id).await
    }

    async fn create_column(&self, board_id: &BoardId, title: &str) -> RemoteResult<Column> {
        self.mutate(|boards| tree::create_column(boards, board_id, title))
            .await
    }

    async fn update_column(&self, id: &ColumnId, title: &str) -> RemoteResult<()> {
        self.mutate(|boards| tree::update_column(boards, id, title))
            .await
    }

    async fn delete_column(&self, id: &ColumnId) -> RemoteResult<()> {
        self.mutate(|boards| tree::delete_column(boards, id)).await
    }

    async fn create_card(
        &self,
        column_id: &ColumnId,
        title: &str,
        description: &str,
    ) -> RemoteResult<Card> {
        self.mutate(|boards| tree::create_card(boards, column_id, title, description))
            .await
    }

    async fn update_card(&self, id: &CardId, title: &str, description: &str) -> RemoteResult<()> {
        self.mutate(|boards| tree::update_card(boards, id, title, description))
            .await
    }

    async fn delete_card(&self, id: &CardId) -> RemoteResult<()> {
        self.mutate(|boards| tree::delete_card(boards, id)).await
    }

    async fn move_card(
        &self,
        card_id: &CardId,
        source_column_id: &ColumnId,
        dest_column_id: &ColumnId,
    ) -> RemoteResult<()> {
        self.mutate(|boards| tree::move_card(boards, card_id, source_column_id, dest_column_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        assert!(!store.is_initialized().await);

        store.initialize().await.unwrap();

        assert!(store.is_initialized().await);
        assert!(store.boards_dir().exists());
        assert!(store.list_boards().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_uninitialized_store_lists_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        assert!(store.list_boards().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_board_tree_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.initialize().await.unwrap();

        let board = store.create_board("Sprint").await.unwrap();
        let todo = store.create_column(&board.id, "Todo").await.unwrap();
        store
            .create_card(&todo.id, "Write docs", "API section")
            .await
            .unwrap();

        let reopened = FileStore::new(temp_dir.path());
        let loaded = reopened.get_board(&board.id).await.unwrap();

        assert_eq!(loaded.title, "Sprint");
        assert_eq!(loaded.columns.len(), 1);
        assert_eq!(loaded.columns[0].cards[0].description, "API section");
    }

    #[tokio::test]
    async fn test_list_keeps_creation_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.initialize().await.unwrap();

        store.create_board("First").await.unwrap();
        store.create_board("Second").await.unwrap();
        store.create_board("Third").await.unwrap();

        let titles: Vec<String> = store
            .list_boards()
            .await
            .unwrap()
            .into_iter()
            .map(|board| board.title)
            .collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_delete_board_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.initialize().await.unwrap();

        let keep = store.create_board("Keep").await.unwrap();
        let gone = store.create_board("Gone").await.unwrap();
        store.delete_board(&gone.id).await.unwrap();

        assert!(!store.board_file(&gone.id).unwrap().exists());
        assert!(store.board_file(&keep.id).unwrap().exists());
        assert!(matches!(
            store.get_board(&gone.id).await,
            Err(RemoteError::NotFound { kind: EntityKind::Board, .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_mutation_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.initialize().await.unwrap();

        let board = store.create_board("Sprint").await.unwrap();
        let err = store
            .create_card(&ColumnId::from("missing"), "Orphan", "")
            .await
            .unwrap_err();

        assert!(matches!(err, RemoteError::NotFound { kind: EntityKind::Column, .. }));
        assert_eq!(store.get_board(&board.id).await.unwrap().card_count(), 0);
    }

    #[tokio::test]
    async fn test_move_card_persists() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.initialize().await.unwrap();

        let board = store.create_board("Sprint").await.unwrap();
        let todo = store.create_column(&board.id, "Todo").await.unwrap();
        let done = store.create_column(&board.id, "Done").await.unwrap();
        let card = store.create_card(&todo.id, "Ship", "").await.unwrap();

        store.move_card(&card.id, &todo.id, &done.id).await.unwrap();

        let loaded = store.get_board(&board.id).await.unwrap();
        assert!(!loaded.column(&todo.id).unwrap().contains_card(&card.id));
        assert!(loaded.column(&done.id).unwrap().contains_card(&card.id));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reads_never_see_a_write_in_progress() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::new(temp_dir.path()));
        store.initialize().await.unwrap();

        let quiet = store.create_board("Quiet").await.unwrap();
        let busy = store.create_board("Busy").await.unwrap();
        let lane = store.create_column(&busy.id, "Lane").await.unwrap();

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for n in 0..100 {
                    store
                        .create_card(&lane.id, &format!("Card {}", n), "")
                        .await
                        .unwrap();
                }
            })
        };

        while !writer.is_finished() {
            let loaded = store.get_board(&quiet.id).await.unwrap();
            assert_eq!(loaded.title, "Quiet");
            assert_eq!(store.list_boards().await.unwrap().len(), 2);
        }
        writer.await.unwrap();

        assert_eq!(store.get_board(&busy.id).await.unwrap().card_count(), 100);
    }

    #[tokio::test]
    async fn test_no_temporary_files_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.initialize().await.unwrap();

        let board = store.create_board("Sprint").await.unwrap();
        store.create_column(&board.id, "Todo").await.unwrap();
        store.update_board(&board.id, "Sprint 2").await.unwrap();

        let mut entries = fs::read_dir(store.boards_dir()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let name = entry.file_name().to_string_lossy().into_owned();
            assert!(name.ends_with(".json"), "unexpected file {}", name);
        }
        assert!(!temp_dir.path().join(".kanban/index.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_path_like_board_ids_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.initialize().await.unwrap();

        for raw in ["../index", "a/b", "a\\b", "..", ""] {
            let err = store.get_board(&BoardId::from(raw)).await.unwrap_err();
            assert!(matches!(err, RemoteError::Rejected(_)), "accepted {:?}", raw);
        }

        assert!(store.list_boards().await.unwrap().is_empty());
    }
}
