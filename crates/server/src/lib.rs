#![warn(missing_docs)]
//! Authoritative waystone session host.
//!
//! [`WaystoneServer`] owns the directory, the rules, and every player
//! session, and is the single writer for all of them: mutation only happens
//! through `&mut self` handlers, which preserves first-registration-wins and
//! idempotent-remove without internal locking. Hosts whose transport runs on
//! multiple threads must funnel events through one owner (a mutex or a
//! dedicated actor) rather than sharing the server.
//!
//! Outbound messages accumulate in an outbox the transport glue drains after
//! each event; the core itself never blocks on I/O.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info, instrument};
use waystones_core::{DimensionId, PlayerId, SimTick, WaystoneId, WaystonePos};
use waystones_net::{decode_client_message, ClientMessage, ServerMessage, WaystoneEntry};
use waystones_world::{
    authorize, commit_teleport, DiscoverySet, PlayerSession, TeleportRequest, WaystoneDirectory,
    WaystoneRecord, WaystonesConfig,
};

/// The session-scoped waystone host.
///
/// Constructed at server/session start and dropped at session end; there is
/// no process-global state. The directory is rebuilt from block entities via
/// [`WaystoneServer::rebuild_directory`] rather than loaded from its own
/// file.
#[derive(Debug)]
pub struct WaystoneServer {
    directory: WaystoneDirectory,
    config: WaystonesConfig,
    sessions: HashMap<PlayerId, PlayerSession>,
    loaded_dimensions: BTreeSet<DimensionId>,
    current_tick: SimTick,
    outbox: Vec<(PlayerId, ServerMessage)>,
}

impl WaystoneServer {
    /// Create a session host with the given rules. All dimensions start
    /// loaded; hosts unload them explicitly as chunk state changes.
    pub fn new(config: WaystonesConfig) -> Self {
        Self {
            directory: WaystoneDirectory::new(),
            config,
            sessions: HashMap::new(),
            loaded_dimensions: BTreeSet::from([
                DimensionId::Overworld,
                DimensionId::Nether,
                DimensionId::End,
            ]),
            current_tick: SimTick::ZERO,
            outbox: Vec::new(),
        }
    }

    /// Reconstruct the directory from waystone block entities present in
    /// loaded world state. Called once at session start; the directory is a
    /// cache, the block entities stay authoritative.
    pub fn rebuild_directory(&mut self, records: impl IntoIterator<Item = WaystoneRecord>) {
        self.directory.rebuild(records);
        info!(count = self.directory.len(), "waystone directory rebuilt");
    }

    /// Mark a dimension loaded or unloaded for teleport targeting.
    pub fn set_dimension_loaded(&mut self, dimension: DimensionId, loaded: bool) {
        if loaded {
            self.loaded_dimensions.insert(dimension);
        } else {
            self.loaded_dimensions.remove(&dimension);
        }
    }

    /// Advance the session clock by one tick.
    pub fn advance_tick(&mut self) {
        self.current_tick = self.current_tick.advance(1);
    }

    /// Current session tick.
    pub fn current_tick(&self) -> SimTick {
        self.current_tick
    }

    /// The live directory.
    pub fn directory(&self) -> &WaystoneDirectory {
        &self.directory
    }

    /// The active rules.
    pub fn config(&self) -> &WaystonesConfig {
        &self.config
    }

    /// A player's session state, if connected.
    pub fn session(&self, player: PlayerId) -> Option<&PlayerSession> {
        self.sessions.get(&player)
    }

    /// Mutable access to a player's session, for host glue that moves
    /// players or grants levels outside the teleport path.
    pub fn session_mut(&mut self, player: PlayerId) -> Option<&mut PlayerSession> {
        self.sessions.get_mut(&player)
    }

    /// Queued outbound messages, drained by the transport layer.
    pub fn drain_outbox(&mut self) -> Vec<(PlayerId, ServerMessage)> {
        std::mem::take(&mut self.outbox)
    }

    /// A player joined: install their session (discovery set comes from
    /// player-entity persistence) and push the rules plus their waystone
    /// list, as on every join.
    #[instrument(skip(self, discovery), fields(player = player.0))]
    pub fn on_join(
        &mut self,
        player: PlayerId,
        pos: WaystonePos,
        discovery: DiscoverySet,
        xp_levels: u32,
    ) {
        let session = PlayerSession::new(player, pos)
            .with_discovery(discovery)
            .with_xp_levels(xp_levels);
        self.sessions.insert(player, session);
        self.push_config(player);
        self.sync_player(player);
    }

    /// A player respawned: their client state reset, so re-push the list.
    #[instrument(skip(self), fields(player = player.0))]
    pub fn on_respawn(&mut self, player: PlayerId, pos: WaystonePos) {
        if let Some(session) = self.sessions.get_mut(&player) {
            session.pos = pos;
        }
        self.sync_player(player);
    }

    /// A player disconnected. Returns their discovery set so the host can
    /// persist it with the player entity.
    pub fn on_disconnect(&mut self, player: PlayerId) -> Option<DiscoverySet> {
        self.sessions.remove(&player).map(|s| s.discovery)
    }

    /// A player right-clicked the waystone block whose entity holds
    /// `record`. Registers it when unknown (first registration wins across
    /// racing players) and unlocks it for the interacting player.
    #[instrument(skip(self, record), fields(player = player.0, id = %record.id))]
    pub fn handle_interact(&mut self, player: PlayerId, record: WaystoneRecord) {
        let id = record.id.clone();
        let added = self.directory.add(record);

        let discovered = match self.sessions.get_mut(&player) {
            Some(session) => session.discovery.discover(id.clone()),
            None => false,
        };
        if discovered {
            debug!(%id, "waystone discovered");
        }

        if added && self.config.global_discovery {
            // Everyone's visible list just grew.
            self.sync_all();
        } else if added || discovered {
            self.sync_player(player);
        }
    }

    /// The waystone block at the other end of `id` was broken or replaced.
    /// Idempotent: the block entity may still exist momentarily during
    /// teardown and report the break more than once.
    #[instrument(skip(self), fields(%id))]
    pub fn on_block_broken(&mut self, id: &WaystoneId) {
        if self.directory.remove(id).is_none() {
            return;
        }
        if self.config.global_discovery {
            self.sync_all();
        } else {
            self.sync_viewers(id);
        }
    }

    /// Feed one raw inbound frame from a client. Frames that fail to decode
    /// or verify are dropped silently; hostile or skewed clients get no
    /// feedback and the session carries on.
    pub fn handle_frame(&mut self, player: PlayerId, frame: &[u8]) {
        let msg = match decode_client_message(frame) {
            Ok(msg) => msg,
            Err(err) => {
                debug!(player = player.0, "dropping undecodable frame: {err:#}");
                return;
            }
        };
        if let Err(reason) = msg.verify() {
            debug!(player = player.0, reason, "dropping invalid message");
            return;
        }
        self.handle_message(player, msg);
    }

    /// Dispatch one verified client message.
    pub fn handle_message(&mut self, player: PlayerId, msg: ClientMessage) {
        match msg {
            ClientMessage::RenameWaystone { id, new_name } => self.handle_rename(&id, &new_name),
            ClientMessage::ForgetWaystone { id } => self.handle_forget(player, &id),
            ClientMessage::TeleportRequest {
                id,
                from_abyss_watcher,
            } => self.handle_teleport(
                player,
                TeleportRequest {
                    id,
                    from_abyss_watcher,
                },
            ),
            ClientMessage::RequestSync => self.sync_player(player),
        }
    }

    fn handle_rename(&mut self, id: &WaystoneId, new_name: &str) {
        if !self.directory.rename(id, new_name) {
            return;
        }
        // Every client with the record in view gets the new label.
        if self.config.global_discovery {
            self.sync_all();
        } else {
            self.sync_viewers(id);
        }
    }

    fn handle_forget(&mut self, player: PlayerId, id: &WaystoneId) {
        // Under global discovery nothing else marks per-player knowledge, so
        // forgetting is destructive at the directory level for everyone.
        if self.config.global_discovery {
            self.directory.remove(id);
            if let Some(session) = self.sessions.get_mut(&player) {
                session.discovery.forget(id);
            }
            self.sync_all();
            return;
        }

        let forgot = match self.sessions.get_mut(&player) {
            Some(session) => session.discovery.forget(id),
            None => false,
        };
        if forgot {
            self.sync_player(player);
        }
    }

    #[instrument(skip(self, request), fields(player = player.0, id = %request.id))]
    fn handle_teleport(&mut self, player: PlayerId, request: TeleportRequest) {
        let ticket = {
            let Some(session) = self.sessions.get(&player) else {
                return;
            };
            match authorize(
                session,
                &self.directory,
                &self.config,
                &request,
                self.current_tick,
            ) {
                Ok(ticket) => ticket,
                Err(reason) => {
                    debug!(%reason, "teleport denied");
                    self.outbox
                        .push((player, ServerMessage::TeleportDenied { reason }));
                    return;
                }
            }
        };

        let Some(session) = self.sessions.get_mut(&player) else {
            return;
        };
        let loaded = &self.loaded_dimensions;
        match commit_teleport(session, &ticket, &self.config, self.current_tick, |dim| {
            loaded.contains(&dim)
        }) {
            Ok(pos) => {
                info!(pos = %pos, "teleport committed");
                self.outbox.push((player, ServerMessage::Teleported { pos }));
            }
            Err(reason) => {
                self.outbox
                    .push((player, ServerMessage::TeleportDenied { reason }));
            }
        }
    }

    /// Re-read the rules from disk and push the update to every client,
    /// re-syncing lists since visibility may have flipped with
    /// global discovery.
    pub fn reload_config(&mut self, path: &Path) {
        self.config = WaystonesConfig::load_from_path(path);
        info!("waystones config reloaded");
        let players: Vec<PlayerId> = self.sessions.keys().copied().collect();
        for player in players {
            self.push_config(player);
        }
        self.sync_all();
    }

    /// Queue the waystone list visible to `player`: the full directory under
    /// global discovery, else their discovered subset with dead references
    /// filtered out.
    pub fn sync_player(&mut self, player: PlayerId) {
        let Some(session) = self.sessions.get(&player) else {
            return;
        };

        let entries: Vec<WaystoneEntry> = if self.config.global_discovery {
            self.directory.iter().map(WaystoneEntry::from).collect()
        } else {
            session
                .discovery
                .iter()
                .filter_map(|id| self.directory.resolve(id))
                .map(WaystoneEntry::from)
                .collect()
        };

        self.outbox
            .push((player, ServerMessage::WaystoneList { entries }));
    }

    fn sync_all(&mut self) {
        let players: Vec<PlayerId> = self.sessions.keys().copied().collect();
        for player in players {
            self.sync_player(player);
        }
    }

    fn sync_viewers(&mut self, id: &WaystoneId) {
        let viewers: Vec<PlayerId> = self
            .sessions
            .values()
            .filter(|s| s.discovery.contains(id))
            .map(|s| s.player_id)
            .collect();
        for player in viewers {
            self.sync_player(player);
        }
    }

    fn push_config(&mut self, player: PlayerId) {
        self.outbox
            .push((player, ServerMessage::ConfigUpdate((&self.config).into())));
    }
}
