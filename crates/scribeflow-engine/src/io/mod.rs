use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::EditorState;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("Snapshot not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed snapshot at {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid snapshot: {0}")]
    Invalid(String),
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Persistence collaborator: where editor snapshots are read from and written to
pub trait SnapshotStore {
    /// Load the stored snapshot; `Ok(None)` when nothing has been stored yet
    fn load(&self) -> Result<Option<EditorState>, IoError>;

    /// Replace the stored snapshot
    fn save(&self, state: &EditorState) -> Result<(), IoError>;
}

/// Parse a snapshot and check it describes a usable document
pub fn parse_snapshot(json: &str, path: &Path) -> Result<EditorState, IoError> {
    let state: EditorState =
        serde_json::from_str(json).map_err(|source| IoError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    state
        .validate()
        .map_err(|e| IoError::Invalid(e.to_string()))?;
    Ok(state)
}

/// Read an editor snapshot from a JSON file
pub fn read_snapshot(path: &Path) -> Result<EditorState, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let json = fs::read_to_string(path)?;
    parse_snapshot(&json, path)
}

/// Write an editor snapshot as JSON, creating parent directories as needed
pub fn write_snapshot(path: &Path, state: &EditorState) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state).map_err(IoError::Serialize)?;
    fs::write(path, json)?;
    Ok(())
}

/// Snapshot stored in a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<EditorState>, IoError> {
        match read_snapshot(&self.path) {
            Ok(state) => Ok(Some(state)),
            Err(IoError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, state: &EditorState) -> Result<(), IoError> {
        write_snapshot(&self.path, state)
    }
}

/// Snapshot kept in memory as serialized JSON, for hosts without storage and for tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    json: RefCell<Option<String>>,
    saves: RefCell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from raw JSON text (which may be malformed)
    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            json: RefCell::new(Some(json.into())),
            saves: RefCell::new(0),
        }
    }

    pub fn json(&self) -> Option<String> {
        self.json.borrow().clone()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<EditorState>, IoError> {
        match self.json.borrow().as_deref() {
            Some(json) => parse_snapshot(json, Path::new("<memory>")).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, state: &EditorState) -> Result<(), IoError> {
        let json = serde_json::to_string(state).map_err(IoError::Serialize)?;
        *self.json.borrow_mut() = Some(json);
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for std::rc::Rc<S> {
    fn load(&self) -> Result<Option<EditorState>, IoError> {
        (**self).load()
    }

    fn save(&self, state: &EditorState) -> Result<(), IoError> {
        (**self).save(state)
    }
}

/// Load the stored snapshot, falling back to a single default paragraph.
///
/// A missing snapshot is normal on first start; a malformed one is logged and
/// discarded. Neither is surfaced to the user.
pub fn restore_or_default(store: &dyn SnapshotStore, default_content: &str) -> EditorState {
    match store.load() {
        Ok(Some(state)) => {
            log::debug!("Restored snapshot with {} blocks", state.blocks.len());
            state
        }
        Ok(None) => {
            log::debug!("No stored snapshot, starting with a default document");
            EditorState::with_default_content(default_content)
        }
        Err(e) => {
            log::error!("Failed to parse saved editor state: {e}");
            EditorState::with_default_content(default_content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockType, DEFAULT_CONTENT, NewBlock};
    use crate::tests::create_test_dir;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_then_read_snapshot() {
        let dir = create_test_dir();
        let path = dir.path().join("state.json");
        let (state, _) = EditorState::default()
            .with_block_inserted(NewBlock::new(BlockType::Quote).with_content("Q"), None);

        write_snapshot(&path, &state).unwrap();
        let loaded = read_snapshot(&path).unwrap();

        assert_eq!(loaded, state);
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = create_test_dir();
        let path = dir.path().join("nested").join("deeper").join("state.json");

        write_snapshot(&path, &EditorState::default()).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_read_missing_snapshot() {
        let dir = create_test_dir();
        let result = read_snapshot(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_read_malformed_snapshot() {
        let dir = create_test_dir();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let result = read_snapshot(&path);
        assert!(matches!(result, Err(IoError::Malformed { .. })));
        assert!(result.unwrap_err().to_string().contains("Malformed snapshot"));
    }

    #[test]
    fn test_snapshot_without_blocks_is_invalid() {
        let result = parse_snapshot(r#"{"blocks":[]}"#, Path::new("x"));
        assert!(matches!(result, Err(IoError::Invalid(_))));
    }

    #[test]
    fn test_snapshot_shape_matches_data_model() {
        let json = r#"{
            "blocks": [
                {"id": "1", "type": "bulletList", "content": "Item", "format": {"bold": true}, "indent": 2},
                {"id": "2", "type": "callout", "content": "", "format": {}, "calloutType": "warning"}
            ],
            "inlineElements": [
                {"id": "l1", "type": "link", "blockId": "1", "startOffset": 0, "endOffset": 4,
                 "data": {"url": "https://example.com", "text": "Link"}}
            ],
            "selection": {"blockId": "1", "startOffset": 1, "endOffset": 1}
        }"#;

        let state = parse_snapshot(json, Path::new("x")).unwrap();

        assert_eq!(state.blocks[0].block_type, BlockType::BulletList);
        assert_eq!(state.blocks[0].indent, 2);
        assert_eq!(state.inline_elements[0].url(), Some("https://example.com"));
        // Selection is transient and ignored on load
        assert_eq!(state.selection, None);
    }

    #[test]
    fn test_file_store_missing_file_loads_none() {
        let dir = create_test_dir();
        let store = FileStore::new(dir.path().join("state.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_restore_falls_back_on_malformed_snapshot() {
        let store = MemoryStore::with_json("[1, 2, 3]");
        let state = restore_or_default(&store, DEFAULT_CONTENT);
        assert_eq!(state, EditorState::default());
    }

    #[test]
    fn test_restore_uses_stored_snapshot() {
        let store = MemoryStore::new();
        let (state, _) = EditorState::default().with_block_inserted(NewBlock::default(), None);
        store.save(&state).unwrap();

        assert_eq!(restore_or_default(&store, DEFAULT_CONTENT), state);
        assert_eq!(store.save_count(), 1);
    }
}
