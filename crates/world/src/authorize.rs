//! Teleport authorization and commit.
//!
//! Authorization is a pure, short-circuiting check chain over the directory,
//! the player's discovery state, and the live config. The commit step is the
//! only place player state mutates, and a commit that fails (target
//! dimension unavailable) mutates nothing: no levels spent, no cooldown
//! armed, the player stays put.

use crate::config::WaystonesConfig;
use crate::directory::WaystoneDirectory;
use crate::session::PlayerSession;
use serde::{Deserialize, Serialize};
use waystones_core::{DimensionId, SimTick, WaystoneId, WaystonePos};

/// Why a teleport request was refused.
///
/// These are expected outcomes, not errors: every one is returned as a value
/// and rendered to the player at the edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum Denial {
    /// The id has no live record: the block was broken, the client is stale,
    /// or the input was bad.
    #[error("that waystone no longer exists")]
    NotFound,
    /// The waystone exists but this player has not discovered it.
    #[error("you have not discovered that waystone")]
    NotDiscovered,
    /// An ordinary teleport arrived before the cooldown expired.
    #[error("teleport available in {remaining_ticks} ticks")]
    OnCooldown {
        /// Ticks until the cooldown lapses.
        remaining_ticks: u64,
    },
    /// The player cannot pay the level cost.
    #[error("teleport requires {required} experience levels")]
    CannotAfford {
        /// Levels the teleport would have cost.
        required: u32,
    },
    /// The target dimension cannot be entered right now.
    #[error("the destination dimension is unavailable")]
    DimensionUnavailable,
}

/// A validated teleport request, as decoded off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeleportRequest {
    /// Target waystone.
    pub id: WaystoneId,
    /// Set when the request came from an abyss watcher item, which waives
    /// cost and cooldown. Discovery gating still applies.
    pub from_abyss_watcher: bool,
}

/// Output of a successful authorization, consumed by [`commit_teleport`].
#[derive(Debug, Clone, PartialEq)]
pub struct TeleportTicket {
    /// Where the player will end up.
    pub target: WaystonePos,
    /// Levels to deduct on commit.
    pub cost: u32,
    /// Whether the commit arms the per-player cooldown.
    pub arms_cooldown: bool,
}

/// Level cost of an ordinary teleport from `from` to `to`.
///
/// Short same-dimension hops are free; cross-dimension travel scales the
/// base cost by the configured multiplier.
pub fn teleport_cost(config: &WaystonesConfig, from: WaystonePos, to: WaystonePos) -> u32 {
    match from.distance_sq(&to) {
        Some(dist_sq) if dist_sq < config.free_below_distance * config.free_below_distance => 0,
        Some(_) => config.teleport_cost_levels,
        None => {
            let scaled =
                config.teleport_cost_levels as f32 * config.cross_dimension_cost_multiplier;
            scaled.ceil() as u32
        }
    }
}

/// Run the authorization chain for one teleport request.
///
/// Checks in order, first failure wins:
/// 1. the id resolves in the directory;
/// 2. the player discovered it, or global discovery is on;
/// 3. unless the request came from an abyss watcher: cooldown, then cost.
pub fn authorize(
    session: &PlayerSession,
    directory: &WaystoneDirectory,
    config: &WaystonesConfig,
    request: &TeleportRequest,
    now: SimTick,
) -> Result<TeleportTicket, Denial> {
    let record = directory.resolve(&request.id).ok_or(Denial::NotFound)?;

    if !config.global_discovery && !session.discovery.contains(&request.id) {
        return Err(Denial::NotDiscovered);
    }

    if request.from_abyss_watcher {
        return Ok(TeleportTicket {
            target: record.pos,
            cost: 0,
            arms_cooldown: false,
        });
    }

    let remaining_ticks = now.until(session.cooldown_until);
    if remaining_ticks > 0 {
        return Err(Denial::OnCooldown { remaining_ticks });
    }

    let cost = teleport_cost(config, session.pos, record.pos);
    if cost > session.xp_levels {
        return Err(Denial::CannotAfford { required: cost });
    }

    Ok(TeleportTicket {
        target: record.pos,
        cost,
        arms_cooldown: config.cooldown_ticks > 0,
    })
}

/// Apply an authorized teleport to the player session.
///
/// `dimension_available` answers whether the target dimension is loaded and
/// enterable. When it is not, the commit aborts with
/// [`Denial::DimensionUnavailable`] and the session is untouched; the player
/// is never left half-moved or charged for a teleport that did not happen.
pub fn commit_teleport(
    session: &mut PlayerSession,
    ticket: &TeleportTicket,
    config: &WaystonesConfig,
    now: SimTick,
    dimension_available: impl Fn(DimensionId) -> bool,
) -> Result<WaystonePos, Denial> {
    if !dimension_available(ticket.target.dimension) {
        return Err(Denial::DimensionUnavailable);
    }

    session.xp_levels -= ticket.cost.min(session.xp_levels);
    if ticket.arms_cooldown {
        session.cooldown_until = now.advance(config.cooldown_ticks);
    }
    session.pos = ticket.target;
    Ok(ticket.target)
}

/// The visibility invariant: a player can teleport to `id` iff the directory
/// holds it and either the player discovered it or global discovery is on.
pub fn can_teleport(
    session: &PlayerSession,
    directory: &WaystoneDirectory,
    config: &WaystonesConfig,
    id: &WaystoneId,
) -> bool {
    directory.contains(id) && (config.global_discovery || session.discovery.contains(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::WaystoneRecord;
    use waystones_core::PlayerId;

    fn setup() -> (PlayerSession, WaystoneDirectory, WaystonesConfig, WaystoneRecord) {
        let spawn = WaystonePos::new(DimensionId::Overworld, 0, 64, 0);
        let session = PlayerSession::new(PlayerId(1), spawn).with_xp_levels(10);
        let mut directory = WaystoneDirectory::new();
        let record = WaystoneRecord::place(WaystonePos::new(DimensionId::Overworld, 500, 64, 0), 1);
        directory.add(record.clone());
        (session, directory, WaystonesConfig::default(), record)
    }

    fn request(record: &WaystoneRecord) -> TeleportRequest {
        TeleportRequest {
            id: record.id.clone(),
            from_abyss_watcher: false,
        }
    }

    #[test]
    fn unknown_id_is_not_found() {
        let (session, directory, config, _) = setup();
        let ghost = WaystoneRecord::place(WaystonePos::new(DimensionId::End, 1, 1, 1), 9);
        let result = authorize(&session, &directory, &config, &request(&ghost), SimTick::ZERO);
        assert_eq!(result.unwrap_err(), Denial::NotFound);
    }

    #[test]
    fn undiscovered_is_denied_before_cost() {
        let (mut session, directory, config, record) = setup();
        session.xp_levels = 0;
        let result = authorize(&session, &directory, &config, &request(&record), SimTick::ZERO);
        assert_eq!(result.unwrap_err(), Denial::NotDiscovered);
    }

    #[test]
    fn global_discovery_waives_the_discovery_check() {
        let (session, directory, mut config, record) = setup();
        config.global_discovery = true;
        let ticket =
            authorize(&session, &directory, &config, &request(&record), SimTick::ZERO).unwrap();
        assert_eq!(ticket.target, record.pos);
    }

    #[test]
    fn cooldown_denied_with_remaining_ticks() {
        let (mut session, directory, mut config, record) = setup();
        config.cooldown_ticks = 200;
        session.discovery.discover(record.id.clone());
        session.cooldown_until = SimTick(150);
        let result = authorize(&session, &directory, &config, &request(&record), SimTick(100));
        assert_eq!(
            result.unwrap_err(),
            Denial::OnCooldown {
                remaining_ticks: 50
            }
        );
    }

    #[test]
    fn unaffordable_teleport_is_denied() {
        let (mut session, directory, mut config, record) = setup();
        config.teleport_cost_levels = 30;
        session.discovery.discover(record.id.clone());
        let result = authorize(&session, &directory, &config, &request(&record), SimTick::ZERO);
        assert_eq!(result.unwrap_err(), Denial::CannotAfford { required: 30 });
    }

    #[test]
    fn short_hops_are_free() {
        let config = WaystonesConfig::default();
        let from = WaystonePos::new(DimensionId::Overworld, 0, 64, 0);
        let near = WaystonePos::new(DimensionId::Overworld, 4, 64, 3);
        assert_eq!(teleport_cost(&config, from, near), 0);
    }

    #[test]
    fn cross_dimension_cost_is_scaled() {
        let mut config = WaystonesConfig::default();
        config.teleport_cost_levels = 3;
        config.cross_dimension_cost_multiplier = 1.5;
        let from = WaystonePos::new(DimensionId::Overworld, 0, 64, 0);
        let nether = WaystonePos::new(DimensionId::Nether, 0, 64, 0);
        assert_eq!(teleport_cost(&config, from, nether), 5);
    }

    #[test]
    fn abyss_watcher_bypasses_cost_and_cooldown_but_not_discovery() {
        let (mut session, directory, mut config, record) = setup();
        config.cooldown_ticks = 200;
        config.teleport_cost_levels = 100;
        session.cooldown_until = SimTick(1_000);
        session.xp_levels = 0;

        let special = TeleportRequest {
            id: record.id.clone(),
            from_abyss_watcher: true,
        };

        // Still gated on discovery.
        let result = authorize(&session, &directory, &config, &special, SimTick::ZERO);
        assert_eq!(result.unwrap_err(), Denial::NotDiscovered);

        // Once discovered, cost and cooldown no longer apply.
        session.discovery.discover(record.id.clone());
        let ticket = authorize(&session, &directory, &config, &special, SimTick::ZERO).unwrap();
        assert_eq!(ticket.cost, 0);
        assert!(!ticket.arms_cooldown);
    }

    #[test]
    fn failed_dimension_commit_leaves_session_untouched() {
        let (mut session, mut directory, mut config, _) = setup();
        config.cooldown_ticks = 100;
        let nether = WaystoneRecord::place(WaystonePos::new(DimensionId::Nether, 9, 40, 9), 3);
        directory.add(nether.clone());
        session.discovery.discover(nether.id.clone());
        let before = session.clone();

        let ticket = authorize(
            &session,
            &directory,
            &config,
            &request(&nether),
            SimTick::ZERO,
        )
        .unwrap();
        let result = commit_teleport(&mut session, &ticket, &config, SimTick::ZERO, |dim| {
            dim != DimensionId::Nether
        });

        assert_eq!(result.unwrap_err(), Denial::DimensionUnavailable);
        assert_eq!(session.pos, before.pos);
        assert_eq!(session.xp_levels, before.xp_levels);
        assert_eq!(session.cooldown_until, before.cooldown_until);
    }

    #[test]
    fn successful_commit_moves_charges_and_arms_cooldown() {
        let (mut session, directory, mut config, record) = setup();
        config.cooldown_ticks = 100;
        session.discovery.discover(record.id.clone());

        let ticket = authorize(&session, &directory, &config, &request(&record), SimTick(5))
            .unwrap();
        let landed =
            commit_teleport(&mut session, &ticket, &config, SimTick(5), |_| true).unwrap();

        assert_eq!(landed, record.pos);
        assert_eq!(session.pos, record.pos);
        assert_eq!(session.xp_levels, 10 - ticket.cost);
        assert_eq!(session.cooldown_until, SimTick(105));
    }

    #[test]
    fn can_teleport_matches_the_visibility_invariant() {
        let (mut session, mut directory, mut config, record) = setup();

        // Present but undiscovered.
        assert!(!can_teleport(&session, &directory, &config, &record.id));

        // Discovered.
        session.discovery.discover(record.id.clone());
        assert!(can_teleport(&session, &directory, &config, &record.id));

        // Global discovery alone suffices.
        session.discovery.forget(&record.id);
        config.global_discovery = true;
        assert!(can_teleport(&session, &directory, &config, &record.id));

        // Gone from the directory: never teleportable, discovered or not.
        directory.remove(&record.id);
        session.discovery.discover(record.id.clone());
        assert!(!can_teleport(&session, &directory, &config, &record.id));
    }
}
