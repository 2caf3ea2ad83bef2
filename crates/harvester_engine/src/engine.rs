use std::sync::mpsc;
use std::thread;

use engine_logging::{engine_error, engine_info};
use harvester_core::ChannelId;

use crate::sink::ChannelProgressSink;
use crate::{EngineEvent, Harvester};

enum EngineCommand {
    Harvest { channel_ids: Vec<ChannelId> },
    ListChannels { guild_id: String },
}

/// Runs harvests on a background tokio runtime and streams their events.
///
/// Commands are handled one at a time, in the order they were sent.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(harvester: Harvester) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                runtime.block_on(handle_command(&harvester, command, &event_tx));
            }
            engine_info!("Engine command channel closed");
        });

        Self { cmd_tx, event_rx }
    }

    pub fn harvest(&self, channel_ids: Vec<ChannelId>) {
        let _ = self.cmd_tx.send(EngineCommand::Harvest { channel_ids });
    }

    pub fn list_channels(&self, guild_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::ListChannels {
            guild_id: guild_id.into(),
        });
    }

    /// Block until the next event; `None` once the engine has stopped.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

async fn handle_command(
    harvester: &Harvester,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Harvest { channel_ids } => {
            let sink = ChannelProgressSink::new(event_tx.clone());
            let summary = harvester.run_harvest(&channel_ids, &sink).await;
            let _ = event_tx.send(EngineEvent::HarvestFinished(summary));
        }
        EngineCommand::ListChannels { guild_id } => {
            let result = harvester.client().guild_channels(&guild_id).await;
            let _ = event_tx.send(EngineEvent::ChannelsListed(result));
        }
    }
}
