use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TodoError};
use crate::model::TodoCollection;

pub trait Storage: Send {
    fn save(&self, todos: &TodoCollection) -> Result<()>;
    fn load(&self) -> Result<TodoCollection>;
}

/// Keeps the whole collection as one JSON array in a single file.
///
/// Saving truncates and rewrites the file in place; a crash halfway through a
/// write can leave it corrupt.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    pretty: bool,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStorage {
            path: path.into(),
            pretty: false,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn save(&self, todos: &TodoCollection) -> Result<()> {
        let json = if self.pretty {
            serde_json::to_string_pretty(todos)
        } else {
            serde_json::to_string(todos)
        }
        .map_err(TodoError::Encode)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), count = todos.len(), "Saved todos");
        Ok(())
    }

    fn load(&self) -> Result<TodoCollection> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Vec::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(TodoError::Decode),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No todo file yet, starting empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TodoItem;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("todo.json"));
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("todo.json"));
        let mut done = TodoItem::new(2, "Walk dog");
        done.status = "done".to_string();
        let todos = vec![TodoItem::new(1, "Test todo"), done];

        storage.save(&todos).unwrap();

        assert_eq!(storage.load().unwrap(), todos);
    }

    #[test]
    fn pretty_output_is_still_one_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("todo.json");
        let storage = FileStorage::new(&path).pretty(true);

        storage.save(&vec![TodoItem::new(1, "Buy milk")]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn malformed_file_is_a_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo.json");
        fs::write(&path, "{not json").unwrap();

        let err = FileStorage::new(&path).load().unwrap_err();
        assert!(matches!(err, TodoError::Decode(_)));
    }

    #[test]
    fn blank_file_loads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo.json");
        fs::write(&path, "\n").unwrap();

        assert!(FileStorage::new(&path).load().unwrap().is_empty());
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("todo.json"));
        storage
            .save(&vec![TodoItem::new(1, "a"), TodoItem::new(2, "b")])
            .unwrap();
        storage.save(&vec![TodoItem::new(2, "b")]).unwrap();

        assert_eq!(storage.load().unwrap(), vec![TodoItem::new(2, "b")]);
    }
}
