//! Command filter and dispatcher
//!
//! Turns a fetched batch into command executions and a single acknowledgment.
//! Entries that cannot run now are left alone; the remote queue offers them
//! again on a later fetch.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{CommandEntry, RemoteApi};
use crate::host::{CommandSink, PlayerLookup};

/// What happened to one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Ids of entries whose commands all ran, in batch order
    pub executed: Vec<i64>,

    /// Target player unknown to the host
    pub skipped_unknown: usize,

    /// Target player offline and the entry requires presence
    pub skipped_offline: usize,

    /// Lookup or execution failed
    pub failed: usize,
}

impl DispatchReport {
    pub fn executed_count(&self) -> usize {
        self.executed.len()
    }
}

/// Outcome for a single entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryOutcome {
    Executed,
    UnknownPlayer,
    Offline,
    Failed,
}

pub struct Dispatcher {
    api: Arc<dyn RemoteApi>,
    players: Arc<dyn PlayerLookup>,
    sink: Arc<dyn CommandSink>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn RemoteApi>, players: Arc<dyn PlayerLookup>, sink: Arc<dyn CommandSink>) -> Self {
        Self { api, players, sink }
    }

    /// Run every eligible entry, then acknowledge them in one call
    pub async fn dispatch(&self, batch: &[CommandEntry]) -> DispatchReport {
        debug!(batch_len = batch.len(), "Dispatcher::dispatch: called");
        let mut report = DispatchReport::default();

        for entry in batch {
            match self.process_entry(entry).await {
                EntryOutcome::Executed => report.executed.push(entry.id),
                EntryOutcome::UnknownPlayer => report.skipped_unknown += 1,
                EntryOutcome::Offline => report.skipped_offline += 1,
                EntryOutcome::Failed => report.failed += 1,
            }
        }

        if !report.executed.is_empty() {
            // Best effort: a lost ack means the entries are delivered again.
            if let Err(e) = self.api.acknowledge(&report.executed).await {
                warn!(error = %e, ids = ?report.executed, "Failed to acknowledge executed commands");
            }
        }

        info!(
            executed = report.executed_count(),
            skipped_unknown = report.skipped_unknown,
            skipped_offline = report.skipped_offline,
            failed = report.failed,
            "Fetched {} commands.",
            report.executed_count()
        );
        report
    }

    async fn process_entry(&self, entry: &CommandEntry) -> EntryOutcome {
        debug!(id = entry.id, player = %entry.steam_id, "Dispatcher::process_entry: called");

        let player = match self.players.find_player(&entry.steam_id).await {
            Ok(Some(player)) => player,
            Ok(None) => {
                debug!(id = entry.id, player = %entry.steam_id, "Dispatcher::process_entry: unknown player, skipping");
                return EntryOutcome::UnknownPlayer;
            }
            Err(e) => {
                warn!(id = entry.id, player = %entry.steam_id, error = %e, "Player lookup failed, skipping entry");
                return EntryOutcome::Failed;
            }
        };

        if entry.must_be_online && !player.connected {
            debug!(id = entry.id, player = %entry.steam_id, "Dispatcher::process_entry: player offline, skipping");
            return EntryOutcome::Offline;
        }

        for command in &entry.commands {
            if let Err(e) = self.sink.execute(command).await {
                warn!(id = entry.id, %command, error = %e, "Command failed, entry left for redelivery");
                return EntryOutcome::Failed;
            }
        }

        EntryOutcome::Executed
    }
}
