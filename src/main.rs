use std::io;

use clap::Parser;
use todo_app::cli::{self, Cli};
use todo_app::logging;
use todo_app::server::{self, Frontend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init("info");

    let config = cli.config();

    if let Some(operation) = cli.operation() {
        return cli::run(&operation, Box::new(config.storage()), &mut io::stdout().lock());
    }

    let frontend = if cli.api { Frontend::Api } else { Frontend::Web };
    server::run(&config, frontend).await
}
