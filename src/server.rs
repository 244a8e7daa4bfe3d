use std::path::PathBuf;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing::info;

use crate::config::Config;
use crate::funnel::StoreHandle;
use crate::store::TodoStore;
use crate::trace::TraceRequests;
use crate::{api, ui};

const DEFAULT_WORKER_COUNT: usize = 4;

pub struct AppState {
    pub store: StoreHandle,
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frontend {
    Web,
    Api,
}

impl Frontend {
    fn configure(self) -> fn(&mut web::ServiceConfig) {
        match self {
            Frontend::Web => ui::config,
            Frontend::Api => api::config,
        }
    }
}

/// Loads the list, starts the store worker, and serves `frontend` until the
/// server stops.
pub async fn run(config: &Config, frontend: Frontend) -> anyhow::Result<()> {
    let store = TodoStore::open(Box::new(config.storage()))
        .with_context(|| format!("Error loading to-dos from {}", config.file.display()))?;

    let app_state = web::Data::new(AppState {
        store: StoreHandle::spawn(store),
        static_dir: config.static_dir.clone(),
    });
    let configure = frontend.configure();
    let address = config.bind_address(frontend == Frontend::Api);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(TraceRequests)
            .configure(configure)
    })
    .workers(DEFAULT_WORKER_COUNT)
    .bind(&address)
    .with_context(|| format!("Failed to bind server to {address}"))?
    .run();

    info!(?frontend, "Starting server on http://{address}");
    server.await.context("Server error")
}
