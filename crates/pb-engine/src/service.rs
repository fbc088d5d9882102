//! League operations and the event lifecycle.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use pb_core::{
    EngineError, EntityKind, Event, EventId, EventStatus, Game, GameId, GenerationMeta, Group,
    GroupId, GroupPlayer, GroupPlayerId, GroupSettings, MembershipType, Player, PlayerDelta,
    PlayerId, PlayerPair, RankingEntry, Result, SkillLevel,
};

use crate::constraints::Participant;
use crate::generator::{generate_schedule, GeneratorLimits, ScheduleRequest};
use crate::pipeline::{self, RecomputeSummary};
use crate::rng::fresh_seed;
use crate::store::LeagueStore;

/// A pre-formed game for history import.
#[derive(Debug, Clone)]
pub struct ImportedGame {
    pub round_index: u32,
    pub court_index: u32,
    pub team1: [GroupPlayerId; 2],
    pub team2: [GroupPlayerId; 2],
    pub score_team1: Option<u32>,
    pub score_team2: Option<u32>,
}

/// The operation surface of the engine, over an injected store.
///
/// Mutating operations are serialized by the `&mut` store access; a
/// generation for one event can never observe partial writes of another.
pub struct LeagueService<'a, S: LeagueStore> {
    store: &'a mut S,
    limits: GeneratorLimits,
}

impl<'a, S: LeagueStore> LeagueService<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self {
            store,
            limits: GeneratorLimits::default(),
        }
    }

    /// Builder method to override the generation caps.
    pub fn with_limits(mut self, limits: GeneratorLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn store(&self) -> &S {
        self.store
    }

    pub fn create_group(&mut self, name: &str, settings: GroupSettings) -> Result<Group> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::Validation("group name must not be empty".into()));
        }
        settings.validate()?;
        let group = Group::new(name, settings);
        self.store.put_group(group.clone());
        Ok(group)
    }

    pub fn add_player(&mut self, display_name: &str, notes: Option<&str>) -> Result<Player> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(EngineError::Validation(
                "player name must not be empty".into(),
            ));
        }
        let mut player = Player::new(display_name);
        if let Some(notes) = notes {
            player = player.with_notes(notes);
        }
        self.store.put_player(player.clone());
        Ok(player)
    }

    /// Add a player to a group. The starting rating is the group baseline,
    /// with the skill offset applied for substitutes.
    pub fn add_group_player(
        &mut self,
        group_id: GroupId,
        player_id: PlayerId,
        membership: MembershipType,
        skill_level: Option<SkillLevel>,
    ) -> Result<GroupPlayer> {
        let group = self
            .store
            .group(group_id)
            .ok_or_else(|| EngineError::not_found(EntityKind::Group, group_id))?
            .clone();
        if self.store.player(player_id).is_none() {
            return Err(EngineError::not_found(EntityKind::Player, player_id));
        }
        if self.store.find_group_player(group_id, player_id).is_some() {
            return Err(EngineError::Validation(
                "player is already a member of this group".into(),
            ));
        }
        if skill_level.is_some() && membership == MembershipType::Permanent {
            return Err(EngineError::Validation(
                "skill level applies to substitutes only".into(),
            ));
        }

        let mut member = GroupPlayer::new(group_id, player_id, membership, 0.0);
        if let Some(level) = skill_level {
            member = member.with_skill_level(level);
        }
        member.rating = member.baseline_rating(group.settings.initial_rating);
        self.store.put_group_player(member.clone());
        Ok(member)
    }

    pub fn create_event(
        &mut self,
        group_id: GroupId,
        name: Option<&str>,
        starts_at: Option<DateTime<Utc>>,
        courts: u32,
        rounds: u32,
        participant_ids: Vec<GroupPlayerId>,
    ) -> Result<Event> {
        if self.store.group(group_id).is_none() {
            return Err(EngineError::not_found(EntityKind::Group, group_id));
        }
        if courts < 1 {
            return Err(EngineError::Validation("courts must be at least 1".into()));
        }
        if rounds < 1 {
            return Err(EngineError::Validation("rounds must be at least 1".into()));
        }
        self.check_participants(group_id, courts, &participant_ids)?;

        let mut event = Event::new(group_id, courts, rounds, participant_ids);
        if let Some(name) = name {
            event = event.with_name(name);
        }
        if let Some(starts_at) = starts_at {
            event = event.with_starts_at(starts_at);
        }
        self.store.put_event(event.clone());
        Ok(event)
    }

    /// Generate (or regenerate) the schedule for an event.
    ///
    /// `new_seed` draws a fresh seed; otherwise a previously stored seed is
    /// replayed, which re-emits the same games for unchanged inputs.
    pub fn generate(&mut self, event_id: EventId, new_seed: bool) -> Result<(Vec<Game>, GenerationMeta)> {
        let event = self
            .store
            .event(event_id)
            .ok_or_else(|| EngineError::not_found(EntityKind::Event, event_id))?
            .clone();
        let group = self
            .store
            .group(event.group_id)
            .ok_or_else(|| EngineError::not_found(EntityKind::Group, event.group_id))?
            .clone();

        if event.status.is_terminal() {
            return Err(EngineError::InvalidState(
                "cannot generate a schedule for a completed event".into(),
            ));
        }
        let scored = self
            .store
            .games_for_event(event_id)
            .iter()
            .any(|g| g.has_any_score());
        if scored {
            return Err(EngineError::InvalidState(
                "cannot regenerate once scores are recorded".into(),
            ));
        }
        if event.participants.len() != event.required_participants() {
            return Err(EngineError::Validation(format!(
                "event requires {} participants, has {}",
                event.required_participants(),
                event.participants.len()
            )));
        }

        let seed = match (&event.generation_meta, new_seed) {
            (Some(meta), false) => meta.seed_used.clone(),
            _ => fresh_seed(event.id),
        };

        let prior_teammates = self.prior_teammate_pairs(&event);
        let mut pool = Vec::with_capacity(event.participants.len());
        for &id in &event.participants {
            let member = self
                .store
                .group_player(id)
                .ok_or_else(|| EngineError::not_found(EntityKind::GroupPlayer, id))?;
            pool.push(Participant {
                id,
                rating: member.rating,
            });
        }

        let request = ScheduleRequest {
            participants: &pool,
            courts: event.courts,
            rounds: event.rounds,
            settings: &group.settings,
            prior_teammates: &prior_teammates,
            seed,
        };
        let schedule = generate_schedule(&request, &self.limits)?;

        self.store.delete_games_for_event(event.id);
        let mut games = Vec::with_capacity(schedule.games.len());
        for draft in &schedule.games {
            let game = Game::new(
                event.id,
                draft.round_index,
                draft.court_index,
                [draft.team1[0].id, draft.team1[1].id],
                [draft.team2[0].id, draft.team2[1].id],
                draft.team1[0].rating + draft.team1[1].rating,
                draft.team2[0].rating + draft.team2[1].rating,
            );
            self.store.put_game(game.clone());
            games.push(game);
        }

        let mut event = event;
        event.status = EventStatus::Generated;
        event.generation_meta = Some(schedule.meta.clone());
        self.store.put_event(event);

        Ok((games, schedule.meta))
    }

    /// Record, edit or clear a game's scores; the result is re-derived.
    ///
    /// Editing scores on a completed event is allowed (the subsequent
    /// recompute restores the aggregates), but clearing them is not.
    pub fn update_score(
        &mut self,
        game_id: GameId,
        score_team1: Option<u32>,
        score_team2: Option<u32>,
    ) -> Result<Game> {
        let mut game = self
            .store
            .game(game_id)
            .ok_or_else(|| EngineError::not_found(EntityKind::Game, game_id))?
            .clone();
        let event = self
            .store
            .event(game.event_id)
            .ok_or_else(|| EngineError::not_found(EntityKind::Event, game.event_id))?
            .clone();

        match event.status {
            EventStatus::Draft => Err(EngineError::InvalidState(
                "cannot score a game on a draft event".into(),
            )),
            EventStatus::Generated | EventStatus::InProgress => {
                game.score_team1 = score_team1;
                game.score_team2 = score_team2;
                self.store.put_game(game.clone());
                if event.status == EventStatus::Generated && game.has_any_score() {
                    let mut event = event;
                    event.status = EventStatus::InProgress;
                    self.store.put_event(event);
                }
                Ok(game)
            }
            EventStatus::Completed => {
                if score_team1.is_none() || score_team2.is_none() {
                    return Err(EngineError::InvalidState(
                        "scores on a completed event can be edited but not cleared".into(),
                    ));
                }
                game.score_team1 = score_team1;
                game.score_team2 = score_team2;
                self.store.put_game(game.clone());
                tracing::warn!(
                    %game_id,
                    event_id = %event.id,
                    "score edited on a completed event; aggregates are stale until recompute"
                );
                Ok(game)
            }
        }
    }

    /// Apply ratings for a fully scored event and mark it completed.
    pub fn complete(&mut self, event_id: EventId) -> Result<Vec<PlayerDelta>> {
        pipeline::complete_event(self.store, event_id)
    }

    /// Reset and replay the group's whole completed history.
    pub fn recompute(&mut self, group_id: GroupId) -> Result<RecomputeSummary> {
        pipeline::recompute_group(self.store, group_id)
    }

    /// Current standings, rating descending with 1-based dense ranks.
    pub fn rankings(&self, group_id: GroupId) -> Result<Vec<RankingEntry>> {
        if self.store.group(group_id).is_none() {
            return Err(EngineError::not_found(EntityKind::Group, group_id));
        }

        let mut rows: Vec<(&GroupPlayer, String)> = self
            .store
            .group_players(group_id)
            .into_iter()
            .map(|member| {
                let name = self
                    .store
                    .player(member.player_id)
                    .map(|p| p.display_name.clone())
                    .unwrap_or_else(|| member.player_id.to_string());
                (member, name)
            })
            .collect();
        rows.sort_by(|(a, a_name), (b, b_name)| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a_name.cmp(b_name))
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut entries = Vec::with_capacity(rows.len());
        let mut rank = 0u32;
        let mut previous: Option<f64> = None;
        for (member, display_name) in rows {
            if previous != Some(member.rating) {
                rank += 1;
                previous = Some(member.rating);
            }
            entries.push(RankingEntry {
                rank,
                group_player_id: member.id,
                display_name,
                rating: member.rating,
                games_played: member.games_played,
                wins: member.wins,
                losses: member.losses,
                ties: member.ties,
                win_rate: member.win_rate(),
            });
        }
        Ok(entries)
    }

    /// Create an event from pre-formed games, for history import.
    ///
    /// The games must already form a valid schedule: every slot filled once,
    /// every participant on exactly one court per round.
    pub fn create_event_with_games(
        &mut self,
        group_id: GroupId,
        name: Option<&str>,
        starts_at: Option<DateTime<Utc>>,
        courts: u32,
        rounds: u32,
        games: Vec<ImportedGame>,
    ) -> Result<Event> {
        if self.store.group(group_id).is_none() {
            return Err(EngineError::not_found(EntityKind::Group, group_id));
        }
        if courts < 1 || rounds < 1 {
            return Err(EngineError::Validation(
                "courts and rounds must be at least 1".into(),
            ));
        }
        if games.len() != (courts * rounds) as usize {
            return Err(EngineError::Validation(format!(
                "expected {} games for {courts} courts x {rounds} rounds, got {}",
                courts * rounds,
                games.len()
            )));
        }

        let mut slots = HashSet::new();
        let mut participants: Vec<GroupPlayerId> = Vec::new();
        for game in &games {
            if game.round_index >= rounds || game.court_index >= courts {
                return Err(EngineError::Validation(format!(
                    "game slot ({}, {}) is out of range",
                    game.round_index, game.court_index
                )));
            }
            if !slots.insert((game.round_index, game.court_index)) {
                return Err(EngineError::Validation(format!(
                    "duplicate game slot ({}, {})",
                    game.round_index, game.court_index
                )));
            }
            let ids = [game.team1[0], game.team1[1], game.team2[0], game.team2[1]];
            let distinct: HashSet<_> = ids.iter().collect();
            if distinct.len() != 4 {
                return Err(EngineError::Validation(
                    "a game needs four distinct players".into(),
                ));
            }
            for id in ids {
                if !participants.contains(&id) {
                    participants.push(id);
                }
            }
        }
        participants.sort();
        self.check_participants(group_id, courts, &participants)?;

        // Each participant plays exactly once per round.
        for round in 0..rounds {
            let mut seen = HashSet::new();
            for game in games.iter().filter(|g| g.round_index == round) {
                for id in [game.team1[0], game.team1[1], game.team2[0], game.team2[1]] {
                    if !seen.insert(id) {
                        return Err(EngineError::Validation(format!(
                            "player {id} appears twice in round {round}"
                        )));
                    }
                }
            }
        }

        let mut event = Event::new(group_id, courts, rounds, participants);
        if let Some(name) = name {
            event = event.with_name(name);
        }
        if let Some(starts_at) = starts_at {
            event = event.with_starts_at(starts_at);
        }

        let mut any_score = false;
        let mut stored_games = Vec::with_capacity(games.len());
        for imported in &games {
            let mut elos = [0.0; 2];
            for (slot, team) in [imported.team1, imported.team2].into_iter().enumerate() {
                elos[slot] = team
                    .iter()
                    .filter_map(|id| self.store.group_player(*id))
                    .map(|gp| gp.rating)
                    .sum();
            }
            let mut game = Game::new(
                event.id,
                imported.round_index,
                imported.court_index,
                imported.team1,
                imported.team2,
                elos[0],
                elos[1],
            );
            game.score_team1 = imported.score_team1;
            game.score_team2 = imported.score_team2;
            any_score |= game.has_any_score();
            stored_games.push(game);
        }

        event.status = if any_score {
            EventStatus::InProgress
        } else {
            EventStatus::Generated
        };
        self.store.put_event(event.clone());
        for game in stored_games {
            self.store.put_game(game);
        }
        Ok(event)
    }

    /// Teammate pairs of the group's most recent completed or in-progress
    /// event strictly before the given one.
    fn prior_teammate_pairs(&self, event: &Event) -> HashSet<PlayerPair> {
        let this_key = (event.chronological_key(), event.id);
        let previous = self
            .store
            .events_for_group(event.group_id)
            .into_iter()
            .filter(|candidate| {
                candidate.id != event.id
                    && matches!(
                        candidate.status,
                        EventStatus::Completed | EventStatus::InProgress
                    )
                    && (candidate.chronological_key(), candidate.id) < this_key
            })
            .last();

        let mut pairs = HashSet::new();
        if let Some(previous) = previous {
            for game in self.store.games_for_event(previous.id) {
                for pair in game.teammate_pairs() {
                    pairs.insert(pair);
                }
            }
        }
        pairs
    }

    fn check_participants(
        &self,
        group_id: GroupId,
        courts: u32,
        participant_ids: &[GroupPlayerId],
    ) -> Result<()> {
        let required = courts as usize * 4;
        if participant_ids.len() != required {
            return Err(EngineError::Validation(format!(
                "{} courts need exactly {required} participants, got {}",
                courts,
                participant_ids.len()
            )));
        }
        let distinct: HashSet<_> = participant_ids.iter().collect();
        if distinct.len() != participant_ids.len() {
            return Err(EngineError::Validation(
                "duplicate participant in event".into(),
            ));
        }
        for &id in participant_ids {
            let member = self
                .store
                .group_player(id)
                .ok_or_else(|| EngineError::not_found(EntityKind::GroupPlayer, id))?;
            if member.group_id != group_id {
                return Err(EngineError::Validation(format!(
                    "participant {id} does not belong to this group"
                )));
            }
        }
        Ok(())
    }
}
