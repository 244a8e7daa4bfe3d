use tracing::{info, warn};

use crate::error::{Result, TodoError};
use crate::model::{next_id, validate_description, TodoCollection, TodoItem};
use crate::storage::Storage;

/// Operations every front end needs from a to-do list.
pub trait TodoManager {
    fn add(&mut self, description: &str) -> Result<TodoItem>;
    fn update_description(&mut self, id: u64, description: &str) -> Result<TodoItem>;
    fn update_status(&mut self, id: u64, status: &str) -> Result<TodoItem>;
    /// Replaces whichever fields are given in one saved step.
    fn update(
        &mut self,
        id: u64,
        description: Option<&str>,
        status: Option<&str>,
    ) -> Result<TodoItem>;
    fn delete(&mut self, id: u64) -> Result<TodoItem>;
    fn list(&self) -> &[TodoItem];
}

/// In-memory collection backed by a [`Storage`].
///
/// Each mutation is applied to a copy of the collection and written out in
/// full; the in-memory state only changes once the save succeeded. Unknown ids
/// are reported as [`TodoError::NotFound`] and nothing is written.
pub struct TodoStore {
    todos: TodoCollection,
    storage: Box<dyn Storage>,
}

impl TodoStore {
    pub fn open(storage: Box<dyn Storage>) -> Result<Self> {
        let todos = storage.load()?;
        Ok(TodoStore { todos, storage })
    }

    fn commit(&mut self, todos: TodoCollection) -> Result<()> {
        self.storage.save(&todos)?;
        self.todos = todos;
        Ok(())
    }

    fn position(&self, id: u64) -> Result<usize> {
        self.todos.iter().position(|todo| todo.id == id).ok_or_else(|| {
            warn!(id, "Todo not found");
            TodoError::NotFound(id)
        })
    }

    fn modify(&mut self, id: u64, edit: impl FnOnce(&mut TodoItem)) -> Result<TodoItem> {
        let index = self.position(id)?;
        let mut todos = self.todos.clone();
        edit(&mut todos[index]);
        let updated = todos[index].clone();
        self.commit(todos)?;
        Ok(updated)
    }
}

impl TodoManager for TodoStore {
    fn add(&mut self, description: &str) -> Result<TodoItem> {
        let description = validate_description(description)?;
        let todo = TodoItem::new(next_id(&self.todos)?, description);

        let mut todos = self.todos.clone();
        todos.push(todo.clone());
        self.commit(todos)?;

        info!(id = todo.id, description = %todo.description, "To-do item added");
        Ok(todo)
    }

    fn update_description(&mut self, id: u64, description: &str) -> Result<TodoItem> {
        let description = validate_description(description)?;
        let todo = self.modify(id, |todo| todo.description = description.to_string())?;
        info!(id, description = %todo.description, "To-do description updated");
        Ok(todo)
    }

    fn update_status(&mut self, id: u64, status: &str) -> Result<TodoItem> {
        let todo = self.modify(id, |todo| todo.status = status.to_string())?;
        info!(id, status = %todo.status, "To-do status updated");
        Ok(todo)
    }

    fn update(
        &mut self,
        id: u64,
        description: Option<&str>,
        status: Option<&str>,
    ) -> Result<TodoItem> {
        if description.is_none() && status.is_none() {
            return Err(TodoError::invalid("No valid update provided"));
        }
        let description = description.map(validate_description).transpose()?;

        let todo = self.modify(id, |todo| {
            if let Some(description) = description {
                todo.description = description.to_string();
            }
            if let Some(status) = status {
                todo.status = status.to_string();
            }
        })?;
        info!(id, description = %todo.description, status = %todo.status, "To-do updated");
        Ok(todo)
    }

    fn delete(&mut self, id: u64) -> Result<TodoItem> {
        let index = self.position(id)?;
        let mut todos = self.todos.clone();
        let removed = todos.remove(index);
        self.commit(todos)?;

        info!(id, "To-do item deleted");
        Ok(removed)
    }

    fn list(&self) -> &[TodoItem] {
        &self.todos
    }
}
