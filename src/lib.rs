//! A to-do list kept in a single JSON file, driven from the command line, an
//! HTML form page, or a small JSON API.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod funnel;
pub mod logging;
pub mod model;
pub mod server;
pub mod storage;
pub mod store;
pub mod trace;
pub mod ui;

pub use config::Config;
pub use error::{Result, TodoError};
pub use funnel::StoreHandle;
pub use model::{TodoCollection, TodoItem, UpdateInput};
pub use storage::{FileStorage, Storage};
pub use store::{TodoManager, TodoStore};
