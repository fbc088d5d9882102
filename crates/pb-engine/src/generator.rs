//! Backtracking schedule generation with automatic constraint relaxation.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use pb_core::{
    unordered_pair, EngineError, GenerationMeta, GroupSettings, PlayerPair, Result,
};

use crate::constraints::{ConstraintSet, PairSet, Participant};
use crate::rng::SeededRng;

/// Caps on the search, supplied by the caller.
#[derive(Debug, Clone)]
pub struct GeneratorLimits {
    /// Candidate partitions evaluated per round before the round is declared
    /// unsatisfiable.
    pub max_attempts_per_round: u64,
    /// Wall-clock budget for the whole generation, relaxation included.
    pub max_duration: Duration,
}

impl Default for GeneratorLimits {
    fn default() -> Self {
        Self {
            max_attempts_per_round: 100_000,
            max_duration: Duration::from_secs(5),
        }
    }
}

/// Everything the generator needs for one event.
pub struct ScheduleRequest<'a> {
    /// Exactly `courts * 4` participants with their current ratings.
    pub participants: &'a [Participant],
    pub courts: u32,
    pub rounds: u32,
    pub settings: &'a GroupSettings,
    /// Teammate pairs of the group's immediately previous event.
    pub prior_teammates: &'a HashSet<PlayerPair>,
    /// Textual seed; the whole search ordering derives from it.
    pub seed: String,
}

/// One generated court-slot, not yet persisted.
#[derive(Debug, Clone, Copy)]
pub struct DraftGame {
    pub round_index: u32,
    pub court_index: u32,
    pub team1: [Participant; 2],
    pub team2: [Participant; 2],
}

/// A complete generated schedule plus how it was produced.
#[derive(Debug, Clone)]
pub struct DraftSchedule {
    pub games: Vec<DraftGame>,
    pub meta: GenerationMeta,
}

/// Generate a full schedule for the request, relaxing the rating bound if
/// the settings allow it.
///
/// The search is deterministic: the candidate ordering derives solely from
/// the seed, so the same request yields the same schedule.
pub fn generate_schedule(
    req: &ScheduleRequest<'_>,
    limits: &GeneratorLimits,
) -> Result<DraftSchedule> {
    validate_request(req)?;

    let settings = req.settings;
    let toggles = settings.constraint_toggles();
    let constraints = ConstraintSet::new(toggles, req.prior_teammates.clone());
    let configured = settings.elo_diff;
    let started = Instant::now();

    let mut effective = configured;
    let mut relax_iterations = 0u32;
    let mut total_attempts = 0u64;

    loop {
        let mut search = Search::new(req, &constraints, effective, limits, started);
        let outcome = search.run();
        total_attempts += search.attempts;

        match outcome {
            Ok(()) => {
                let meta = GenerationMeta {
                    seed_used: req.seed.clone(),
                    elo_diff_configured: configured,
                    elo_diff_used: effective,
                    relax_iterations,
                    attempts: total_attempts,
                    duration_ms: started.elapsed().as_millis() as u64,
                    constraints: toggles,
                };
                tracing::info!(
                    attempts = total_attempts,
                    relax_iterations,
                    elo_diff_used = effective,
                    "schedule generated"
                );
                return Ok(DraftSchedule {
                    games: search.games,
                    meta,
                });
            }
            Err(fail_round) => {
                let next = effective + settings.auto_relax_step;
                let can_relax = settings.auto_relax_elo_diff
                    && !search.timed_out
                    && next <= settings.auto_relax_max_elo_diff + 1e-9;
                if can_relax {
                    tracing::debug!(
                        round = fail_round,
                        from = effective,
                        to = next,
                        "relaxing rating bound"
                    );
                    relax_iterations += 1;
                    effective = next;
                    continue;
                }
                return Err(EngineError::UnsatisfiableConstraints {
                    round_index: fail_round,
                    elo_diff_used: effective,
                });
            }
        }
    }
}

fn validate_request(req: &ScheduleRequest<'_>) -> Result<()> {
    if req.courts < 1 {
        return Err(EngineError::Validation("courts must be at least 1".into()));
    }
    if req.rounds < 1 {
        return Err(EngineError::Validation("rounds must be at least 1".into()));
    }
    let required = req.courts as usize * 4;
    if req.participants.len() != required {
        return Err(EngineError::Validation(format!(
            "expected {} participants for {} courts, got {}",
            required,
            req.courts,
            req.participants.len()
        )));
    }
    let distinct: HashSet<_> = req.participants.iter().map(|p| p.id).collect();
    if distinct.len() != req.participants.len() {
        return Err(EngineError::Validation(
            "duplicate participant in request".into(),
        ));
    }
    Ok(())
}

/// One search run at a fixed rating bound.
///
/// Per round the participant pool is shuffled once from the seed stream;
/// candidate 4-subsets are then enumerated lexicographically over that order
/// and each subset is split into the three possible 2v2 pairings. Placement
/// state lives in pre-sized buffers and is mutated and undone in place.
struct Search<'a> {
    req: &'a ScheduleRequest<'a>,
    constraints: &'a ConstraintSet,
    bound: f64,
    limits: &'a GeneratorLimits,
    started: Instant,

    /// Per-round shuffled participant order, drawn up front.
    round_orders: Vec<Vec<Participant>>,
    /// Per-round assignment mask over `round_orders`.
    used: Vec<Vec<bool>>,
    teammates: PairSet,
    opponents: PairSet,
    games: Vec<DraftGame>,
    /// Rounds that were completely filled at least once.
    round_filled: Vec<bool>,

    attempts: u64,
    round_attempts: Vec<u64>,
    timed_out: bool,
}

/// Search aborted at this round (attempts cap or wall clock).
struct Abort(u32);

impl<'a> Search<'a> {
    fn new(
        req: &'a ScheduleRequest<'a>,
        constraints: &'a ConstraintSet,
        bound: f64,
        limits: &'a GeneratorLimits,
        started: Instant,
    ) -> Self {
        let rounds = req.rounds as usize;
        let n = req.participants.len();

        let mut rng = SeededRng::from_seed(req.seed.clone());
        let round_orders: Vec<Vec<Participant>> = (0..rounds)
            .map(|_| {
                let mut order = req.participants.to_vec();
                rng.shuffle(&mut order);
                order
            })
            .collect();

        Self {
            req,
            constraints,
            bound,
            limits,
            started,
            round_orders,
            used: vec![vec![false; n]; rounds],
            teammates: PairSet::new(),
            opponents: PairSet::new(),
            games: Vec::with_capacity(rounds * req.courts as usize),
            round_filled: vec![false; rounds],
            attempts: 0,
            round_attempts: vec![0; rounds],
            timed_out: false,
        }
    }

    /// Run to completion. `Err` carries the first round that could not be
    /// completed.
    fn run(&mut self) -> std::result::Result<(), u32> {
        match self.solve_round(0) {
            Ok(true) => Ok(()),
            Ok(false) => {
                let fail = self
                    .round_filled
                    .iter()
                    .position(|filled| !filled)
                    .unwrap_or(0);
                Err(fail as u32)
            }
            Err(Abort(round)) => Err(round),
        }
    }

    fn solve_round(&mut self, round: usize) -> std::result::Result<bool, Abort> {
        if round == self.req.rounds as usize {
            return Ok(true);
        }
        for slot in self.used[round].iter_mut() {
            *slot = false;
        }
        self.solve_court(round, 0)
    }

    fn solve_court(&mut self, round: usize, court: usize) -> std::result::Result<bool, Abort> {
        if court == self.req.courts as usize {
            self.round_filled[round] = true;
            return self.solve_round(round + 1);
        }

        let n = self.round_orders[round].len();
        for i in 0..n {
            if self.used[round][i] {
                continue;
            }
            for j in (i + 1)..n {
                if self.used[round][j] {
                    continue;
                }
                for k in (j + 1)..n {
                    if self.used[round][k] {
                        continue;
                    }
                    for l in (k + 1)..n {
                        if self.used[round][l] {
                            continue;
                        }
                        if self.try_subset(round, court, [i, j, k, l])? {
                            return Ok(true);
                        }
                    }
                }
            }
        }
        Ok(false)
    }

    /// Try the three 2v2 splits of one 4-subset on the given court.
    fn try_subset(
        &mut self,
        round: usize,
        court: usize,
        picks: [usize; 4],
    ) -> std::result::Result<bool, Abort> {
        let [a, b, c, d] = picks.map(|i| self.round_orders[round][i]);
        let splits = [([a, b], [c, d]), ([a, c], [b, d]), ([a, d], [b, c])];

        for (team1, team2) in splits {
            self.count_attempt(round)?;
            if self
                .constraints
                .check_game(team1, team2, &self.teammates, &self.opponents, self.bound)
                .is_err()
            {
                continue;
            }

            self.place(round, court, team1, team2);
            for &i in &picks {
                self.used[round][i] = true;
            }

            if self.solve_court(round, court + 1)? {
                return Ok(true);
            }

            for &i in &picks {
                self.used[round][i] = false;
            }
            self.unplace();
        }
        Ok(false)
    }

    fn count_attempt(&mut self, round: usize) -> std::result::Result<(), Abort> {
        self.attempts += 1;
        self.round_attempts[round] += 1;
        if self.round_attempts[round] > self.limits.max_attempts_per_round {
            return Err(Abort(round as u32));
        }
        // The clock is coarse; polling it every attempt would dominate.
        if self.attempts % 1024 == 0 && self.started.elapsed() > self.limits.max_duration {
            self.timed_out = true;
            return Err(Abort(round as u32));
        }
        Ok(())
    }

    fn place(&mut self, round: usize, court: usize, team1: [Participant; 2], team2: [Participant; 2]) {
        self.teammates.add(unordered_pair(team1[0].id, team1[1].id));
        self.teammates.add(unordered_pair(team2[0].id, team2[1].id));
        for a in team1 {
            for b in team2 {
                self.opponents.add(unordered_pair(a.id, b.id));
            }
        }
        self.games.push(DraftGame {
            round_index: round as u32,
            court_index: court as u32,
            team1,
            team2,
        });
    }

    fn unplace(&mut self) {
        let Some(game) = self.games.pop() else {
            return;
        };
        self.teammates
            .remove(unordered_pair(game.team1[0].id, game.team1[1].id));
        self.teammates
            .remove(unordered_pair(game.team2[0].id, game.team2[1].id));
        for a in game.team1 {
            for b in game.team2 {
                self.opponents.remove(unordered_pair(a.id, b.id));
            }
        }
    }
}
