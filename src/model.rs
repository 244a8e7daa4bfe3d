use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TodoError;

/// Status given to every freshly added item.
pub const DEFAULT_STATUS: &str = "pending";

/// The whole persisted list, in insertion order.
pub type TodoCollection = Vec<TodoItem>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: u64,
    pub description: String,
    pub status: String,
}

impl TodoItem {
    pub fn new(id: u64, description: impl Into<String>) -> Self {
        TodoItem {
            id,
            description: description.into(),
            status: DEFAULT_STATUS.to_string(),
        }
    }
}

impl fmt::Display for TodoItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. [{}] {}", self.id, self.status, self.description)
    }
}

/// Next id to hand out: one past the largest id present, or 1 for an empty list.
///
/// Fails once the largest id is `u64::MAX` rather than wrapping onto a used id.
pub fn next_id(todos: &[TodoItem]) -> Result<u64, TodoError> {
    match todos.iter().map(|todo| todo.id).max() {
        None => Ok(1),
        Some(id) => id
            .checked_add(1)
            .ok_or_else(|| TodoError::invalid("id space exhausted")),
    }
}

/// Rejects blank descriptions, returning the text unchanged otherwise.
pub fn validate_description(description: &str) -> Result<&str, TodoError> {
    if description.trim().is_empty() {
        return Err(TodoError::invalid("Description cannot be empty"));
    }
    Ok(description)
}

/// An `ID:Text` pair as typed on the command line, e.g. `3:Buy bread`.
///
/// Only the first `:` separates, so the text may contain colons of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInput {
    pub id: u64,
    pub value: String,
}

impl FromStr for UpdateInput {
    type Err = TodoError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (id, value) = input
            .split_once(':')
            .ok_or_else(|| TodoError::invalid(format!("expected ID:Text, got '{input}'")))?;
        let id = id
            .trim()
            .parse::<u64>()
            .map_err(|_| TodoError::invalid(format!("invalid ID '{}'", id.trim())))?;
        Ok(UpdateInput {
            id,
            value: value.to_string(),
        })
    }
}
