//! The storage port and its in-memory implementation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use pb_core::{
    Event, EventId, Game, GameId, Group, GroupId, GroupPlayer, GroupPlayerId, Player, PlayerId,
    RatingUpdate,
};

/// Storage port for the engine.
///
/// The engine is synchronous; blocking belongs to implementations of this
/// trait. Accessors that return collections return them in a deterministic
/// order: games by `(round_index, court_index)`, events by chronological
/// key, rating updates in insertion order.
pub trait LeagueStore {
    fn put_group(&mut self, group: Group);
    fn group(&self, id: GroupId) -> Option<&Group>;
    fn groups(&self) -> Vec<&Group>;

    fn put_player(&mut self, player: Player);
    fn player(&self, id: PlayerId) -> Option<&Player>;

    fn put_group_player(&mut self, group_player: GroupPlayer);
    fn group_player(&self, id: GroupPlayerId) -> Option<&GroupPlayer>;
    fn group_players(&self, group_id: GroupId) -> Vec<&GroupPlayer>;
    fn find_group_player(&self, group_id: GroupId, player_id: PlayerId) -> Option<&GroupPlayer>;

    fn put_event(&mut self, event: Event);
    fn event(&self, id: EventId) -> Option<&Event>;
    fn events_for_group(&self, group_id: GroupId) -> Vec<&Event>;

    fn put_game(&mut self, game: Game);
    fn game(&self, id: GameId) -> Option<&Game>;
    fn games_for_event(&self, event_id: EventId) -> Vec<&Game>;
    fn delete_games_for_event(&mut self, event_id: EventId);

    fn push_rating_update(&mut self, update: RatingUpdate);
    fn rating_updates_for_event(&self, event_id: EventId) -> Vec<&RatingUpdate>;
    fn rating_updates_for_group(&self, group_id: GroupId) -> Vec<&RatingUpdate>;
    fn delete_rating_updates_for_group(&mut self, group_id: GroupId);
}

/// Map-backed store; the whole league state in memory.
///
/// Serializable so a collaborator can persist it wholesale (the CLI keeps it
/// as a JSON file).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemoryStore {
    groups: HashMap<GroupId, Group>,
    players: HashMap<PlayerId, Player>,
    group_players: HashMap<GroupPlayerId, GroupPlayer>,
    events: HashMap<EventId, Event>,
    games: HashMap<GameId, Game>,
    rating_updates: Vec<RatingUpdate>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeagueStore for MemoryStore {
    fn put_group(&mut self, group: Group) {
        self.groups.insert(group.id, group);
    }

    fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    fn groups(&self) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self.groups.values().collect();
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        groups
    }

    fn put_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    fn put_group_player(&mut self, group_player: GroupPlayer) {
        self.group_players.insert(group_player.id, group_player);
    }

    fn group_player(&self, id: GroupPlayerId) -> Option<&GroupPlayer> {
        self.group_players.get(&id)
    }

    fn group_players(&self, group_id: GroupId) -> Vec<&GroupPlayer> {
        let mut members: Vec<&GroupPlayer> = self
            .group_players
            .values()
            .filter(|gp| gp.group_id == group_id)
            .collect();
        members.sort_by_key(|gp| gp.id);
        members
    }

    fn find_group_player(&self, group_id: GroupId, player_id: PlayerId) -> Option<&GroupPlayer> {
        self.group_players
            .values()
            .find(|gp| gp.group_id == group_id && gp.player_id == player_id)
    }

    fn put_event(&mut self, event: Event) {
        self.events.insert(event.id, event);
    }

    fn event(&self, id: EventId) -> Option<&Event> {
        self.events.get(&id)
    }

    fn events_for_group(&self, group_id: GroupId) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .events
            .values()
            .filter(|e| e.group_id == group_id)
            .collect();
        events.sort_by(|a, b| {
            a.chronological_key()
                .cmp(&b.chronological_key())
                .then(a.id.cmp(&b.id))
        });
        events
    }

    fn put_game(&mut self, game: Game) {
        self.games.insert(game.id, game);
    }

    fn game(&self, id: GameId) -> Option<&Game> {
        self.games.get(&id)
    }

    fn games_for_event(&self, event_id: EventId) -> Vec<&Game> {
        let mut games: Vec<&Game> = self
            .games
            .values()
            .filter(|g| g.event_id == event_id)
            .collect();
        games.sort_by_key(|g| (g.round_index, g.court_index));
        games
    }

    fn delete_games_for_event(&mut self, event_id: EventId) {
        self.games.retain(|_, g| g.event_id != event_id);
    }

    fn push_rating_update(&mut self, update: RatingUpdate) {
        self.rating_updates.push(update);
    }

    fn rating_updates_for_event(&self, event_id: EventId) -> Vec<&RatingUpdate> {
        self.rating_updates
            .iter()
            .filter(|u| u.event_id == event_id)
            .collect()
    }

    fn rating_updates_for_group(&self, group_id: GroupId) -> Vec<&RatingUpdate> {
        let event_ids: std::collections::HashSet<EventId> = self
            .events
            .values()
            .filter(|e| e.group_id == group_id)
            .map(|e| e.id)
            .collect();
        self.rating_updates
            .iter()
            .filter(|u| event_ids.contains(&u.event_id))
            .collect()
    }

    fn delete_rating_updates_for_group(&mut self, group_id: GroupId) {
        let event_ids: std::collections::HashSet<EventId> = self
            .events
            .values()
            .filter(|e| e.group_id == group_id)
            .map(|e| e.id)
            .collect();
        self.rating_updates.retain(|u| !event_ids.contains(&u.event_id));
    }
}
