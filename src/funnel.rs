//! Single-writer access to a [`TodoManager`] shared by HTTP handlers.
//!
//! One tokio task owns the store and drains a queue of commands. Handlers hold a
//! cloneable [`StoreHandle`] and await the reply, so mutations never interleave
//! and each one is saved before the next command is looked at.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::error::{Result, TodoError};
use crate::model::{TodoCollection, TodoItem};
use crate::store::TodoManager;

const QUEUE_CAPACITY: usize = 64;

type Reply<T> = oneshot::Sender<Result<T>>;

enum Command {
    List(oneshot::Sender<TodoCollection>),
    Add {
        description: String,
        reply: Reply<TodoItem>,
    },
    Update {
        id: u64,
        description: Option<String>,
        status: Option<String>,
        reply: Reply<TodoCollection>,
    },
    Delete {
        id: u64,
        reply: Reply<TodoItem>,
    },
}

#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<Command>,
}

impl StoreHandle {
    /// Moves `store` onto a dedicated worker task. Must be called inside a tokio
    /// runtime. The worker stops once every handle has been dropped.
    pub fn spawn<M>(store: M) -> Self
    where
        M: TodoManager + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        tokio::spawn(run(store, rx));
        StoreHandle { tx }
    }

    pub async fn list(&self) -> Result<TodoCollection> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::List(reply)).await?;
        rx.await.map_err(|_| TodoError::StoreClosed)
    }

    pub async fn add(&self, description: impl Into<String>) -> Result<TodoItem> {
        let description = description.into();
        self.request(|reply| Command::Add { description, reply })
            .await
    }

    /// Applies both fields in one queued step and answers the list as it
    /// stands right after that step.
    pub async fn update(
        &self,
        id: u64,
        description: Option<String>,
        status: Option<String>,
    ) -> Result<TodoCollection> {
        self.request(|reply| Command::Update {
            id,
            description,
            status,
            reply,
        })
        .await
    }

    pub async fn delete(&self, id: u64) -> Result<TodoItem> {
        self.request(|reply| Command::Delete { id, reply }).await
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.send(build(reply)).await?;
        rx.await.map_err(|_| TodoError::StoreClosed)?
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| TodoError::StoreClosed)
    }
}

async fn run<M: TodoManager>(mut store: M, mut rx: mpsc::Receiver<Command>) {
    info!(count = store.list().len(), "Todo store worker started");

    while let Some(command) = rx.recv().await {
        // A dropped receiver only means the caller went away.
        match command {
            Command::List(reply) => {
                let _ = reply.send(store.list().to_vec());
            }
            Command::Add { description, reply } => {
                let _ = reply.send(store.add(&description));
            }
            Command::Update {
                id,
                description,
                status,
                reply,
            } => {
                let result = store
                    .update(id, description.as_deref(), status.as_deref())
                    .map(|_| store.list().to_vec());
                let _ = reply.send(result);
            }
            Command::Delete { id, reply } => {
                let _ = reply.send(store.delete(id));
            }
        }
    }

    debug!("Todo store worker stopped");
}
