use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgGroup, Parser};
use tracing::{info_span, warn};
use uuid::Uuid;

use crate::config::{Config, DEFAULT_FILE, DEFAULT_STATIC_DIR};
use crate::error::TodoError;
use crate::model::UpdateInput;
use crate::storage::Storage;
use crate::store::{TodoManager, TodoStore};

#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(about = "Manage a to-do list stored in a JSON file")]
#[command(version)]
#[command(group(ArgGroup::new("operation").multiple(false)))]
pub struct Cli {
    /// Add a new to-do item
    #[arg(long, value_name = "DESCRIPTION", group = "operation")]
    pub add: Option<String>,

    /// Update a to-do item, format ID:Description
    #[arg(long, value_name = "ID:DESCRIPTION", group = "operation")]
    pub update: Option<String>,

    /// Delete a to-do item by ID
    #[arg(long, value_name = "ID", group = "operation")]
    pub delete: Option<u64>,

    /// Update the status of a to-do item, format ID:Status
    #[arg(long, value_name = "ID:STATUS", group = "operation")]
    pub status: Option<String>,

    /// List all to-do items
    #[arg(long, group = "operation")]
    pub list: bool,

    /// Run the JSON API server instead of the web UI
    #[arg(long, conflicts_with = "operation")]
    pub api: bool,

    /// JSON file holding the to-do list
    #[arg(long, env = "TODO_FILE", default_value = DEFAULT_FILE)]
    pub file: PathBuf,

    /// Port for the server (defaults to 8080 for the web UI, 8081 for the API)
    #[arg(long, env = "TODO_PORT")]
    pub port: Option<u16>,

    /// Directory served under /static
    #[arg(long, env = "TODO_STATIC_DIR", default_value = DEFAULT_STATIC_DIR)]
    pub static_dir: PathBuf,

    /// Pretty-print the JSON file
    #[arg(long, env = "TODO_PRETTY")]
    pub pretty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Add(String),
    UpdateDescription(String),
    UpdateStatus(String),
    Delete(u64),
    List,
}

impl Cli {
    pub fn config(&self) -> Config {
        let mut config = Config {
            file: self.file.clone(),
            static_dir: self.static_dir.clone(),
            pretty: self.pretty,
            ..Config::default()
        };
        if let Some(port) = self.port {
            if self.api {
                config.api_port = port;
            } else {
                config.web_port = port;
            }
        }
        config
    }

    /// The requested one-shot operation, or `None` when a server should run.
    pub fn operation(&self) -> Option<Operation> {
        if let Some(description) = &self.add {
            Some(Operation::Add(description.clone()))
        } else if let Some(input) = &self.update {
            Some(Operation::UpdateDescription(input.clone()))
        } else if let Some(id) = self.delete {
            Some(Operation::Delete(id))
        } else if let Some(input) = &self.status {
            Some(Operation::UpdateStatus(input.clone()))
        } else if self.list {
            Some(Operation::List)
        } else {
            None
        }
    }
}

/// Loads the list, applies `operation`, and writes results to `out`.
///
/// Unknown ids and malformed input are logged as warnings and leave the file
/// untouched; load and save failures are returned. Every log line of one run
/// carries the same `trace_id`.
pub fn run(operation: &Operation, storage: Box<dyn Storage>, out: &mut dyn Write) -> anyhow::Result<()> {
    let span = info_span!("cli", trace_id = %Uuid::new_v4());
    let _guard = span.enter();

    let mut store = TodoStore::open(storage).context("Error loading to-dos")?;

    let result = match operation {
        Operation::List => {
            if store.list().is_empty() {
                writeln!(out, "No to-do items found.")?;
            }
            for todo in store.list() {
                writeln!(out, "{todo}")?;
            }
            return Ok(());
        }
        Operation::Add(description) => store
            .add(description)
            .map(|todo| format!("Added to-do {}", todo.id)),
        Operation::UpdateDescription(input) => input
            .parse::<UpdateInput>()
            .and_then(|input| store.update_description(input.id, &input.value))
            .map(|todo| format!("Updated to-do {}", todo.id)),
        Operation::UpdateStatus(input) => input
            .parse::<UpdateInput>()
            .and_then(|input| store.update_status(input.id, &input.value))
            .map(|todo| format!("Updated status of to-do {}", todo.id)),
        Operation::Delete(id) => store
            .delete(*id)
            .map(|todo| format!("Deleted to-do {}", todo.id)),
    };

    match result {
        Ok(message) => writeln!(out, "{message}")?,
        Err(e @ (TodoError::NotFound(_) | TodoError::InvalidInput(_))) => {
            warn!(error = %e, "Operation skipped");
        }
        Err(e) => return Err(e).context("Failed to save to-dos"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TodoItem;
    use crate::storage::FileStorage;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn run_on(dir: &TempDir, operation: Operation) -> String {
        let storage = FileStorage::new(dir.path().join("todo.json"));
        let mut out = Vec::new();
        run(&operation, Box::new(storage), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn load(dir: &TempDir) -> Vec<TodoItem> {
        FileStorage::new(dir.path().join("todo.json")).load().unwrap()
    }

    #[test]
    fn parses_operation_flags() {
        let cli = Cli::parse_from(["todo", "--add", "Buy milk"]);
        assert_eq!(cli.operation(), Some(Operation::Add("Buy milk".into())));

        let cli = Cli::parse_from(["todo", "--delete", "3"]);
        assert_eq!(cli.operation(), Some(Operation::Delete(3)));

        let cli = Cli::parse_from(["todo", "--status", "1:done"]);
        assert_eq!(cli.operation(), Some(Operation::UpdateStatus("1:done".into())));
    }

    #[test]
    fn no_operation_means_serve() {
        let cli = Cli::parse_from(["todo", "--api", "--port", "9000"]);
        assert_eq!(cli.operation(), None);
        assert_eq!(cli.config().api_port, 9000);
        assert_eq!(cli.config().web_port, 8080);
    }

    #[test]
    fn operations_are_mutually_exclusive() {
        assert!(Cli::try_parse_from(["todo", "--add", "a", "--list"]).is_err());
        assert!(Cli::try_parse_from(["todo", "--list", "--api"]).is_err());
    }

    #[test]
    fn add_update_delete_through_the_file() {
        let dir = TempDir::new().unwrap();

        assert_eq!(run_on(&dir, Operation::Add("Buy milk".into())), "Added to-do 1\n");
        assert_eq!(load(&dir), vec![TodoItem::new(1, "Buy milk")]);

        run_on(&dir, Operation::UpdateDescription("1:Buy bread".into()));
        assert_eq!(load(&dir), vec![TodoItem::new(1, "Buy bread")]);

        run_on(&dir, Operation::Delete(1));
        assert!(load(&dir).is_empty());
    }

    #[test]
    fn list_prints_each_item() {
        let dir = TempDir::new().unwrap();
        assert_eq!(run_on(&dir, Operation::List), "No to-do items found.\n");

        run_on(&dir, Operation::Add("Buy milk".into()));
        run_on(&dir, Operation::UpdateStatus("1:done".into()));

        assert_eq!(run_on(&dir, Operation::List), "1. [done] Buy milk\n");
    }

    #[test]
    fn malformed_and_unknown_input_is_skipped() {
        let dir = TempDir::new().unwrap();
        run_on(&dir, Operation::Add("Buy milk".into()));

        assert_eq!(run_on(&dir, Operation::UpdateDescription("Buy bread".into())), "");
        assert_eq!(run_on(&dir, Operation::UpdateStatus("7:done".into())), "");
        assert_eq!(run_on(&dir, Operation::Delete(7)), "");

        assert_eq!(load(&dir), vec![TodoItem::new(1, "Buy milk")]);
    }

    #[test]
    fn malformed_file_fails_the_run() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("todo.json"), "[{").unwrap();
        let storage = FileStorage::new(dir.path().join("todo.json"));

        let err = run(&Operation::List, Box::new(storage), &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("Error loading to-dos"));
    }

    #[test]
    fn pretty_flag_reaches_the_storage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo.json");
        let cli = Cli::parse_from(["todo", "--list", "--pretty", "--file", path.to_str().unwrap()]);

        let config = cli.config();
        assert!(config.pretty);
        config.storage().save(&vec![TodoItem::new(1, "Buy milk")]).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  {"));
    }

    #[test]
    fn log_lines_carry_a_trace_id() {
        let dir = TempDir::new().unwrap();
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            run_on(&dir, Operation::Delete(7));
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Operation skipped"));
        assert!(output.contains("cli{trace_id="));
    }
}
