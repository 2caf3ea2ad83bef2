mod cli;
mod config;
mod report;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use engine_logging::{engine_info, engine_warn};
use harvester_core::select_channels;
use harvester_engine::{
    DiscordRestClient, EngineEvent, EngineHandle, FetchSettings, Harvester, ReqwestFetcher,
};
use log::LevelFilter;

use cli::Cli;
use config::AppConfig;
use report::Reporter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    engine_logging::initialize(cli.log.into(), LevelFilter::Info);

    let config = AppConfig::from_cli(&cli)?;
    let settings = config.harvest_settings(&cli)?;
    let client = DiscordRestClient::new(config.rest_settings()?)
        .context("cannot create service client")?;
    let fetcher =
        ReqwestFetcher::new(FetchSettings::default()).context("cannot create download client")?;
    engine_info!(
        "Harvest destination {} concurrency {}",
        settings.dest_root.display(),
        settings.concurrency
    );

    let engine = EngineHandle::new(Harvester::new(
        Arc::new(client),
        Arc::new(fetcher),
        settings,
    ));

    let channel_ids = if cli.channel_ids.is_empty() {
        discover_channels(&engine, &config)?
    } else {
        cli.channel_ids.clone()
    };
    if channel_ids.is_empty() {
        engine_warn!("No channels selected; nothing to harvest");
        return Ok(());
    }

    engine.harvest(channel_ids);
    let mut reporter = Reporter::new(std::io::stdout().lock(), cli.json);
    loop {
        match engine.recv() {
            Some(EngineEvent::Harvest(event)) => reporter.event(&event)?,
            Some(EngineEvent::HarvestFinished(summary)) => {
                reporter.summary(&summary)?;
                return Ok(());
            }
            Some(EngineEvent::ChannelsListed(_)) => {}
            None => bail!("engine stopped before the harvest finished"),
        }
    }
}

fn discover_channels(engine: &EngineHandle, config: &AppConfig) -> Result<Vec<String>> {
    let Some(server_id) = config.server_id.as_deref() else {
        bail!("no channel ids given and no `server_id` configured");
    };
    engine.list_channels(server_id);
    loop {
        match engine.recv() {
            Some(EngineEvent::ChannelsListed(result)) => {
                let channels =
                    result.with_context(|| format!("cannot list channels of server {server_id}"))?;
                let selected = select_channels(&channels, &config.categories);
                engine_info!(
                    "Discovered {} channels, {} selected by category",
                    channels.len(),
                    selected.len()
                );
                return Ok(selected);
            }
            Some(_) => {}
            None => bail!("engine stopped while listing channels"),
        }
    }
}
