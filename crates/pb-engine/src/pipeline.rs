//! The rating pipeline: event completion and full-group recomputation.
//!
//! The pipeline is the only writer of `GroupPlayer.rating`, the aggregate
//! counters, and `RatingUpdate`s. Both operations compute their full write
//! set on working copies first and publish only when every step succeeded,
//! so a failure never leaves partial state behind.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use pb_core::{
    EngineError, EntityKind, Event, EventId, EventStatus, Game, GameResult, GroupId, GroupPlayer,
    GroupPlayerId, PlayerDelta, RatingSystem, RatingUpdate, Result,
};
use pb_strategies::{strategy_for, GameContext, RatingStrategy};

use crate::store::LeagueStore;

/// Counts returned by a group recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecomputeSummary {
    pub events_recalculated: u32,
    pub players_updated: u32,
}

/// Complete an event: apply the group's rating system to every game, write
/// the audit trail, update live ratings and aggregates, and mark the event
/// `Completed`.
///
/// Preconditions: the event is `Generated` or `InProgress` and every game
/// has both scores.
pub fn complete_event<S: LeagueStore>(store: &mut S, event_id: EventId) -> Result<Vec<PlayerDelta>> {
    let event = store
        .event(event_id)
        .ok_or_else(|| EngineError::not_found(EntityKind::Event, event_id))?
        .clone();
    if !event.status.can_complete() {
        return Err(EngineError::InvalidState(format!(
            "cannot complete event in state {:?}",
            event.status
        )));
    }

    let group = store
        .group(event.group_id)
        .ok_or_else(|| EngineError::not_found(EntityKind::Group, event.group_id))?
        .clone();

    let games: Vec<Game> = store
        .games_for_event(event_id)
        .into_iter()
        .cloned()
        .collect();
    if games.is_empty() {
        return Err(EngineError::InvalidState(
            "event has no games to complete".into(),
        ));
    }
    for game in &games {
        if !game.has_scores() {
            return Err(EngineError::InvalidState(format!(
                "game at round {} court {} is missing scores",
                game.round_index, game.court_index
            )));
        }
    }

    let mut working = working_copies(store, group.id);
    let strategy = strategy_for(&group.settings);
    let mut updates = Vec::new();
    replay_event(
        &mut working,
        &mut updates,
        &event,
        &games,
        strategy.as_ref(),
        group.settings.rating_system,
    )?;

    let deltas = aggregate_deltas(&updates);

    for player in working.into_values() {
        store.put_group_player(player);
    }
    for update in updates {
        store.push_rating_update(update);
    }
    let mut event = event;
    event.status = EventStatus::Completed;
    store.put_event(event);

    tracing::info!(%event_id, players = deltas.len(), "event completed");
    Ok(deltas)
}

/// Reset every member of the group to its baseline and replay the full
/// completed-event history in chronological order.
///
/// Idempotent: a second run reproduces identical ratings, aggregates and
/// rating updates.
pub fn recompute_group<S: LeagueStore>(store: &mut S, group_id: GroupId) -> Result<RecomputeSummary> {
    let group = store
        .group(group_id)
        .ok_or_else(|| EngineError::not_found(EntityKind::Group, group_id))?
        .clone();

    let mut working = working_copies(store, group_id);
    for player in working.values_mut() {
        let baseline = player.baseline_rating(group.settings.initial_rating);
        player.reset(baseline);
    }

    let events: Vec<Event> = store
        .events_for_group(group_id)
        .into_iter()
        .filter(|e| e.status == EventStatus::Completed)
        .cloned()
        .collect();

    let strategy = strategy_for(&group.settings);
    let mut updates = Vec::new();
    for event in &events {
        let games: Vec<Game> = store
            .games_for_event(event.id)
            .into_iter()
            .cloned()
            .collect();
        replay_event(
            &mut working,
            &mut updates,
            event,
            &games,
            strategy.as_ref(),
            group.settings.rating_system,
        )?;
    }

    store.delete_rating_updates_for_group(group_id);
    let players_updated = working.len() as u32;
    for player in working.into_values() {
        store.put_group_player(player);
    }
    for update in updates {
        store.push_rating_update(update);
    }

    let summary = RecomputeSummary {
        events_recalculated: events.len() as u32,
        players_updated,
    };
    tracing::info!(
        %group_id,
        events = summary.events_recalculated,
        players = summary.players_updated,
        "group recomputed"
    );
    Ok(summary)
}

fn working_copies<S: LeagueStore>(
    store: &S,
    group_id: GroupId,
) -> HashMap<GroupPlayerId, GroupPlayer> {
    store
        .group_players(group_id)
        .into_iter()
        .cloned()
        .map(|gp| (gp.id, gp))
        .collect()
}

/// Replay one event's games against the working copies, in
/// `(round_index, court_index)` order.
///
/// The group mean consumed by catch-up scaling is captured once, before the
/// event's first game.
fn replay_event(
    working: &mut HashMap<GroupPlayerId, GroupPlayer>,
    updates: &mut Vec<RatingUpdate>,
    event: &Event,
    games: &[Game],
    strategy: &dyn RatingStrategy,
    system: RatingSystem,
) -> Result<()> {
    let group_mean = group_mean_rating(working);

    for game in games {
        let result = game.result();
        let (Some(score_team1), Some(score_team2)) = (game.score_team1, game.score_team2) else {
            return Err(EngineError::Internal(format!(
                "game {} in event {} has no result",
                game.id, event.id
            )));
        };

        let ids = game.players();
        let mut ratings = [0.0; 4];
        for (i, id) in ids.iter().enumerate() {
            let player = working.get(id).ok_or_else(|| {
                EngineError::Internal(format!(
                    "game {} references group player {} outside the group",
                    game.id, id
                ))
            })?;
            ratings[i] = player.rating;
        }

        let ctx = GameContext {
            team1: [ratings[0], ratings[1]],
            team2: [ratings[2], ratings[3]],
            result,
            score_team1,
            score_team2,
            group_mean_rating: group_mean,
        };
        let deltas = strategy.compute_deltas(&ctx);

        for (i, id) in ids.iter().enumerate() {
            let Some(player) = working.get_mut(id) else {
                continue;
            };
            let before = player.rating;
            let after = before + deltas[i];
            player.rating = after;
            player.games_played += 1;
            let on_team1 = i < 2;
            match (result, on_team1) {
                (GameResult::Team1Win, true) | (GameResult::Team2Win, false) => player.wins += 1,
                (GameResult::Team1Win, false) | (GameResult::Team2Win, true) => player.losses += 1,
                (GameResult::Tie, _) => player.ties += 1,
                (GameResult::Unset, _) => {}
            }
            updates.push(RatingUpdate {
                event_id: event.id,
                group_player_id: *id,
                rating_before: before,
                rating_after: after,
                delta: deltas[i],
                system,
            });
        }
    }
    Ok(())
}

fn group_mean_rating(working: &HashMap<GroupPlayerId, GroupPlayer>) -> f64 {
    if working.is_empty() {
        return 0.0;
    }
    working.values().map(|gp| gp.rating).sum::<f64>() / working.len() as f64
}

/// Fold per-game updates into one delta per player, first-seen order.
fn aggregate_deltas(updates: &[RatingUpdate]) -> Vec<PlayerDelta> {
    let mut order: Vec<GroupPlayerId> = Vec::new();
    let mut by_player: HashMap<GroupPlayerId, PlayerDelta> = HashMap::new();
    for update in updates {
        let entry = by_player
            .entry(update.group_player_id)
            .or_insert_with(|| {
                order.push(update.group_player_id);
                PlayerDelta {
                    group_player_id: update.group_player_id,
                    delta: 0.0,
                    rating_after: update.rating_before,
                }
            });
        entry.delta += update.delta;
        entry.rating_after = update.rating_after;
    }
    order
        .into_iter()
        .filter_map(|id| by_player.remove(&id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pb_core::{Group, GroupSettings, MembershipType, Player, SkillLevel};

    struct Fixture {
        store: MemoryStore,
        group_id: GroupId,
        members: Vec<GroupPlayerId>,
    }

    fn create_test_group(ratings: &[f64], settings: GroupSettings) -> Fixture {
        let mut store = MemoryStore::new();
        let group = Group::new("test", settings);
        let group_id = group.id;
        store.put_group(group);

        let members = ratings
            .iter()
            .enumerate()
            .map(|(i, &rating)| {
                let player = Player::new(format!("Player {i}"));
                let membership =
                    GroupPlayer::new(group_id, player.id, MembershipType::Permanent, rating);
                let id = membership.id;
                store.put_player(player);
                store.put_group_player(membership);
                id
            })
            .collect();

        Fixture {
            store,
            group_id,
            members,
        }
    }

    /// One event with pre-formed, scored games, bypassing generation.
    fn add_scored_event(
        fixture: &mut Fixture,
        games: &[(u32, u32, [usize; 4], u32, u32)],
        courts: u32,
        rounds: u32,
    ) -> EventId {
        let participants = fixture.members.clone();
        let mut event = Event::new(fixture.group_id, courts, rounds, participants);
        event.status = EventStatus::InProgress;
        let event_id = event.id;
        fixture.store.put_event(event);

        for &(round, court, slots, s1, s2) in games {
            let mut game = Game::new(
                event_id,
                round,
                court,
                [fixture.members[slots[0]], fixture.members[slots[1]]],
                [fixture.members[slots[2]], fixture.members[slots[3]]],
                0.0,
                0.0,
            );
            game.score_team1 = Some(s1);
            game.score_team2 = Some(s2);
            fixture.store.put_game(game);
        }
        event_id
    }

    fn rating_of(fixture: &Fixture, index: usize) -> f64 {
        fixture
            .store
            .group_player(fixture.members[index])
            .unwrap()
            .rating
    }

    #[test]
    fn test_serious_elo_arithmetic() {
        // Even teams, k=32: winners +16 each, losers -16 each.
        let mut fixture = create_test_group(&[1000.0; 4], GroupSettings::default());
        let event_id = add_scored_event(&mut fixture, &[(0, 0, [0, 1, 2, 3], 11, 7)], 1, 1);

        let deltas = complete_event(&mut fixture.store, event_id).unwrap();
        assert_eq!(deltas.len(), 4);
        for delta in &deltas[..2] {
            assert!((delta.delta - 16.0).abs() < 1e-9);
        }
        for delta in &deltas[2..] {
            assert!((delta.delta + 16.0).abs() < 1e-9);
        }

        assert_eq!(rating_of(&fixture, 0), 1016.0);
        assert_eq!(rating_of(&fixture, 3), 984.0);

        let updates = fixture.store.rating_updates_for_event(event_id);
        assert_eq!(updates.len(), 4);
        assert!(updates
            .iter()
            .all(|u| (u.rating_after - u.rating_before - u.delta).abs() < 1e-9));

        let event = fixture.store.event(event_id).unwrap();
        assert_eq!(event.status, EventStatus::Completed);
    }

    #[test]
    fn test_aggregates_follow_results() {
        let mut fixture = create_test_group(&[1000.0; 4], GroupSettings::default());
        let event_id = add_scored_event(
            &mut fixture,
            &[
                (0, 0, [0, 1, 2, 3], 11, 7),
                (1, 0, [0, 2, 1, 3], 9, 9),
            ],
            1,
            2,
        );
        complete_event(&mut fixture.store, event_id).unwrap();

        let p0 = fixture.store.group_player(fixture.members[0]).unwrap();
        assert_eq!(p0.games_played, 2);
        assert_eq!(p0.wins, 1);
        assert_eq!(p0.ties, 1);
        assert_eq!(p0.losses, 0);

        let p3 = fixture.store.group_player(fixture.members[3]).unwrap();
        assert_eq!(p3.losses, 1);
        assert_eq!(p3.ties, 1);
    }

    #[test]
    fn test_updates_chain_within_event() {
        let mut fixture = create_test_group(&[1000.0, 980.0, 1020.0, 1000.0], GroupSettings::default());
        let event_id = add_scored_event(
            &mut fixture,
            &[
                (0, 0, [0, 1, 2, 3], 11, 5),
                (1, 0, [0, 2, 1, 3], 7, 11),
            ],
            1,
            2,
        );
        complete_event(&mut fixture.store, event_id).unwrap();

        for member in fixture.members.clone() {
            let chain: Vec<&RatingUpdate> = fixture
                .store
                .rating_updates_for_event(event_id)
                .into_iter()
                .filter(|u| u.group_player_id == member)
                .collect();
            assert_eq!(chain.len(), 2);
            assert!((chain[0].rating_after - chain[1].rating_before).abs() < 1e-12);
            // The summed deltas equal the net rating movement.
            let total: f64 = chain.iter().map(|u| u.delta).sum();
            let net = chain[1].rating_after - chain[0].rating_before;
            assert!((total - net).abs() < 1e-9);
        }
    }

    #[test]
    fn test_complete_rejects_missing_scores() {
        let mut fixture = create_test_group(&[1000.0; 4], GroupSettings::default());
        let participants = fixture.members.clone();
        let mut event = Event::new(fixture.group_id, 1, 1, participants);
        event.status = EventStatus::Generated;
        let event_id = event.id;
        fixture.store.put_event(event);
        fixture.store.put_game(Game::new(
            event_id,
            0,
            0,
            [fixture.members[0], fixture.members[1]],
            [fixture.members[2], fixture.members[3]],
            2000.0,
            2000.0,
        ));

        let err = complete_event(&mut fixture.store, event_id).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
        // Nothing was written.
        assert_eq!(fixture.store.rating_updates_for_event(event_id).len(), 0);
        assert_eq!(rating_of(&fixture, 0), 1000.0);
    }

    #[test]
    fn test_complete_rejects_completed_event() {
        let mut fixture = create_test_group(&[1000.0; 4], GroupSettings::default());
        let event_id = add_scored_event(&mut fixture, &[(0, 0, [0, 1, 2, 3], 11, 7)], 1, 1);
        complete_event(&mut fixture.store, event_id).unwrap();

        let err = complete_event(&mut fixture.store, event_id).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
    }

    #[test]
    fn test_recompute_matches_complete() {
        let settings = GroupSettings::default();
        let mut fixture = create_test_group(&[1000.0; 4], settings);

        let first = add_scored_event(&mut fixture, &[(0, 0, [0, 1, 2, 3], 11, 6)], 1, 1);
        complete_event(&mut fixture.store, first).unwrap();
        let second = add_scored_event(&mut fixture, &[(0, 0, [0, 2, 1, 3], 8, 11)], 1, 1);
        complete_event(&mut fixture.store, second).unwrap();

        let before: Vec<f64> = (0..4).map(|i| rating_of(&fixture, i)).collect();

        let summary = recompute_group(&mut fixture.store, fixture.group_id).unwrap();
        assert_eq!(summary.events_recalculated, 2);
        assert_eq!(summary.players_updated, 4);

        for (i, &expected) in before.iter().enumerate() {
            assert!((rating_of(&fixture, i) - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut fixture = create_test_group(&[1000.0; 4], GroupSettings::default());
        let event_id = add_scored_event(
            &mut fixture,
            &[
                (0, 0, [0, 1, 2, 3], 11, 3),
                (1, 0, [0, 2, 1, 3], 11, 9),
            ],
            1,
            2,
        );
        complete_event(&mut fixture.store, event_id).unwrap();

        recompute_group(&mut fixture.store, fixture.group_id).unwrap();
        let ratings_once: Vec<f64> = (0..4).map(|i| rating_of(&fixture, i)).collect();
        let updates_once: Vec<(GroupPlayerId, f64, f64)> = fixture
            .store
            .rating_updates_for_group(fixture.group_id)
            .iter()
            .map(|u| (u.group_player_id, u.rating_before, u.rating_after))
            .collect();

        recompute_group(&mut fixture.store, fixture.group_id).unwrap();
        let ratings_twice: Vec<f64> = (0..4).map(|i| rating_of(&fixture, i)).collect();
        let updates_twice: Vec<(GroupPlayerId, f64, f64)> = fixture
            .store
            .rating_updates_for_group(fixture.group_id)
            .iter()
            .map(|u| (u.group_player_id, u.rating_before, u.rating_after))
            .collect();

        assert_eq!(ratings_once, ratings_twice);
        assert_eq!(updates_once, updates_twice);
    }

    #[test]
    fn test_recompute_applies_sub_skill_offsets() {
        let mut fixture = create_test_group(&[1000.0; 4], GroupSettings::default());

        // Turn one member into an advanced sub and another into a beginner.
        let mut advanced = fixture
            .store
            .group_player(fixture.members[0])
            .unwrap()
            .clone();
        advanced.membership = MembershipType::Sub;
        advanced.skill_level = Some(SkillLevel::Advanced);
        fixture.store.put_group_player(advanced);

        let mut beginner = fixture
            .store
            .group_player(fixture.members[1])
            .unwrap()
            .clone();
        beginner.membership = MembershipType::Sub;
        beginner.skill_level = Some(SkillLevel::Beginner);
        fixture.store.put_group_player(beginner);

        recompute_group(&mut fixture.store, fixture.group_id).unwrap();

        assert_eq!(rating_of(&fixture, 0), 1100.0);
        assert_eq!(rating_of(&fixture, 1), 900.0);
        assert_eq!(rating_of(&fixture, 2), 1000.0);
    }

    #[test]
    fn test_recompute_after_score_edit_restores_invariants() {
        let mut fixture = create_test_group(&[1000.0; 4], GroupSettings::default());
        let event_id = add_scored_event(&mut fixture, &[(0, 0, [0, 1, 2, 3], 11, 7)], 1, 1);
        complete_event(&mut fixture.store, event_id).unwrap();
        assert_eq!(rating_of(&fixture, 0), 1016.0);

        // Flip the score on the completed event, then recompute.
        let mut game = fixture.store.games_for_event(event_id)[0].clone();
        game.score_team1 = Some(7);
        game.score_team2 = Some(11);
        fixture.store.put_game(game);

        recompute_group(&mut fixture.store, fixture.group_id).unwrap();
        assert_eq!(rating_of(&fixture, 0), 984.0);
        assert_eq!(rating_of(&fixture, 2), 1016.0);

        let p0 = fixture.store.group_player(fixture.members[0]).unwrap();
        assert_eq!((p0.wins, p0.losses, p0.ties), (0, 1, 0));
    }

    #[test]
    fn test_catch_up_history_replays_exactly() {
        let settings = GroupSettings {
            rating_system: RatingSystem::CatchUp,
            ..Default::default()
        };
        let mut fixture = create_test_group(&[1000.0; 4], settings);

        // First event spreads the ratings, second one plays across the spread.
        let first = add_scored_event(&mut fixture, &[(0, 0, [0, 1, 2, 3], 11, 1)], 1, 1);
        complete_event(&mut fixture.store, first).unwrap();
        let second = add_scored_event(&mut fixture, &[(0, 0, [0, 2, 1, 3], 11, 2)], 1, 1);
        let deltas = complete_event(&mut fixture.store, second).unwrap();

        // In the second game, the below-mean winner outgains the above-mean one.
        assert!(rating_of(&fixture, 0) > 1000.0);
        let gain_above_mean = deltas.iter().find(|d| d.group_player_id == fixture.members[0]);
        let gain_below_mean = deltas.iter().find(|d| d.group_player_id == fixture.members[2]);
        assert!(gain_below_mean.unwrap().delta > gain_above_mean.unwrap().delta);

        // Recompute replays the exact same chain.
        let before: Vec<f64> = (0..4).map(|i| rating_of(&fixture, i)).collect();
        recompute_group(&mut fixture.store, fixture.group_id).unwrap();
        for (i, &expected) in before.iter().enumerate() {
            assert!((rating_of(&fixture, i) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_racs_blowout_outweighs_close_game() {
        let settings = GroupSettings {
            rating_system: RatingSystem::RacsElo,
            ..Default::default()
        };
        let mut fixture = create_test_group(&[1000.0; 8], settings);
        let event_id = add_scored_event(
            &mut fixture,
            &[
                (0, 0, [0, 1, 2, 3], 11, 0),
                (0, 1, [4, 5, 6, 7], 11, 9),
            ],
            2,
            1,
        );
        complete_event(&mut fixture.store, event_id).unwrap();

        let blowout_gain = rating_of(&fixture, 0) - 1000.0;
        let close_gain = rating_of(&fixture, 4) - 1000.0;
        assert!(blowout_gain > close_gain);
        assert!(close_gain > 0.0);
    }
}
