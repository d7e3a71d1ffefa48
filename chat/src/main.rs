use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use time::UtcOffset;
use tracing::info;

use lounge::{
    config::{Cli, Config},
    console, Session, SessionOptions, SystemEnvironment,
};
use lounge_core::{services::log, FileStorage};

fn main() -> Result<()> {
    // must run before any other thread exists
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let cli = Cli::parse();
    let cfg = Config::load(&cli)?;
    log::init(cfg.logging_enabled);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cfg, offset))
}

async fn run(cfg: Config, offset: UtcOffset) -> Result<()> {
    let storage = FileStorage::open(&cfg.data_dir)?;
    info!(path = %storage.path().display(), "using storage");
    let session = Session::start(
        Arc::new(storage),
        SessionOptions {
            presence: cfg.presence,
            env: Arc::new(SystemEnvironment),
        },
    );
    let result = console::run(session.handle(), offset).await;
    session.shutdown().await;
    result
}
