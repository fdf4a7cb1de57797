use anyhow::Result;
use lotto_checker::{DrawRepository, HttpDrawSource, config};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod mcp_handler;
mod use_cases;

use mcp_handler::{MCPHandler, stdio};
use use_cases::{CheckUseCase, CollectUseCase, DrawUseCase};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Let's check your lottery tickets.");

    let repository = Arc::new(DrawRepository::from_config(&config));
    let source = Arc::new(HttpDrawSource::new(config.source_url.clone()));

    // Fail fast on an unusable database before accepting requests.
    let stored = repository.list_draws()?;
    tracing::info!(
        database = %config.database_url.display(),
        draws = stored.len(),
        "draw database ready"
    );

    let draw_use_case = DrawUseCase::new(Arc::clone(&repository));
    let check_use_case = CheckUseCase::new(Arc::clone(&repository));
    let collect_use_case = CollectUseCase::new(Arc::clone(&repository), source);

    let handler = MCPHandler::new(
        Arc::new(draw_use_case),
        Arc::new(check_use_case),
        Arc::new(collect_use_case),
    );

    let (reader, writer) = stdio();

    handler.serve(reader, writer).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    Ok(())
}
