use anyhow::{Result, bail};
use std::env;
use tracing_subscriber::EnvFilter;

use lotto_checker::{
    DrawRepository, HttpDrawSource, check_response, collect_latest, config, latest_complete,
};

const USAGE: &str = "usage: lotto-checker [collect | latest | source-latest | list | check <number>...]";

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let repository = DrawRepository::from_config(&config);
    let source = HttpDrawSource::new(config.source_url.clone());

    let args: Vec<String> = env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("collect");

    match command {
        "collect" => match config.collect_interval {
            None => {
                let outcome = collect_latest(&source, &repository).await?;
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
            Some(period) => {
                tracing::info!(?period, "collecting draws periodically");
                let mut interval = tokio::time::interval(period);
                loop {
                    interval.tick().await;
                    match collect_latest(&source, &repository).await {
                        Ok(outcome) => tracing::info!(?outcome, "collection round finished"),
                        Err(e) => tracing::error!(error = %e, "collection round failed"),
                    }
                }
            }
        },
        "latest" => match repository.get_latest_record()? {
            Some(stored) => println!("{}", serde_json::to_string_pretty(&stored)?),
            None => println!("⚠ No lottery draw stored yet."),
        },
        "source-latest" => {
            let (draw_id, draw) = latest_complete(&source).await?;
            tracing::info!(%draw_id, "latest complete draw at source");
            println!("{}", serde_json::to_string_pretty(&draw)?);
        }
        "list" => {
            for record in repository.list_draws()? {
                println!("{}\t{}\t{}", record.draw_id, record.draw_date, record.created_at);
            }
        }
        "check" => {
            let numbers = &args[1..];
            if numbers.is_empty() {
                bail!("{}", USAGE);
            }
            let Some(draw) = repository.get_latest()? else {
                bail!("no lottery draw stored yet, run `lotto-checker collect` first");
            };
            println!("{}", serde_json::to_string_pretty(&check_response(numbers, &draw))?);
        }
        other => bail!("unknown command {:?}\n{}", other, USAGE),
    }

    Ok(())
}
