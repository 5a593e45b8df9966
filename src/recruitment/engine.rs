//! Recruitment engine
//!
//! `evaluate()` tells the turn loop whether recruiting is possible at all.
//! `execute()` runs one recruitment pass: it scores every candidate of every
//! leader that can recruit, then works through the jobs, recruiting or
//! recalling one unit per iteration until the jobs are done, gold is to be
//! saved, or something outside the pass changed the game.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::board::{average_lawful_bonus, ActionExecutor, ActionOutcome, GameBoard, Side};
use crate::combat::{CombatContext, CombatEstimator};
use crate::core::config::RecruitmentAspects;
use crate::core::types::{Gold, SideId, Turn, UnitId};
use crate::map::Location;
use crate::pathfinding::{MoveCostCalculator, SearchContext};
use crate::recruitment::constants::{
    BAD_SCORE, LEADER_IN_DANGER_RATIO, SAVE_GOLD_FORECAST_TURNS, SCOUT_BONUS, VILLAGE_PER_SCOUT_MULTIPLICATOR,
};
use crate::recruitment::important_hexes::{find_important_hexes, ImportantHexes};
use crate::recruitment::instructions::{recruit_matches_type, recruit_matches_types, RecruitJob, RecruitmentInstructions};
use crate::recruitment::leader_data::LeaderRecruitmentData;
use crate::recruitment::scoring::{
    analyze_combat, apply_randomness, apply_recruitment_more, apply_similarity_penalty, enemy_units,
};
use crate::recruitment::state::{estimated_income, unit_ratio, RecruitmentState};
use crate::units::{Unit, UnitTypeRegistry};

const DEFAULT_SEED: u64 = 42;

/// One recruit or recall made during a pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecruitmentAction {
    pub leader: UnitId,
    pub type_id: String,
    /// Set when the unit came from the recall list
    pub recalled: Option<UnitId>,
    pub location: Location,
}

/// Why a pass stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassEnd {
    NoLeaders,
    SavingGold,
    NoJobs,
    /// A non-blocker job could not be served
    JobDeferred,
    RecruitListChanged,
    GamestateChanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassReport {
    pub side: SideId,
    pub turn: Turn,
    pub end: PassEnd,
    /// State after the pass
    pub state: RecruitmentState,
    pub actions: Vec<RecruitmentAction>,
    pub failures: Vec<ActionOutcome>,
    pub leaders_in_danger: Vec<UnitId>,
}

/// Average cost of the types `type_id` advances to, its own cost if none
pub fn average_advancement_cost(registry: &UnitTypeRegistry, type_id: &str) -> f64 {
    let Some(unit_type) = registry.find(type_id) else {
        return 0.0;
    };
    let costs: Vec<f64> = unit_type
        .advances_to
        .iter()
        .filter_map(|id| registry.find(id))
        .map(|t| t.cost as f64)
        .collect();
    if costs.is_empty() {
        return unit_type.cost as f64;
    }
    costs.iter().sum::<f64>() / costs.len() as f64
}

/// Cost plus experience progress priced at the next level's cost
pub fn recall_worth(registry: &UnitTypeRegistry, unit: &Unit) -> f64 {
    unit.cost as f64 + unit.xp_fraction() * average_advancement_cost(registry, &unit.type_id)
}

/// The most valuable `type_id` unit `leader` may recall, if it is worth more
/// than the side's recall price
pub fn best_recall(registry: &UnitTypeRegistry, side: &Side, leader: &Unit, type_id: &str) -> Option<UnitId> {
    let price = side.recall_cost as f64;
    let mut best: Option<(UnitId, f64)> = None;
    for unit in side.recall_list.iter().filter(|u| u.type_id == type_id) {
        if !leader.can_recall(unit) {
            continue;
        }
        let worth = recall_worth(registry, unit);
        if worth <= price {
            continue;
        }
        if best.map_or(true, |(_, best_worth)| worth > best_worth) {
            best = Some((unit.id, worth));
        }
    }
    best.map(|(id, _)| id)
}

/// Cheapest recruit or recall open to `leader`; `None` if it has no options
pub fn cheapest_option_cost(registry: &UnitTypeRegistry, side: &Side, leader: &Unit) -> Option<Gold> {
    let recruit = side
        .recruits()
        .iter()
        .chain(&leader.extra_recruits)
        .filter_map(|id| registry.find(id))
        .map(|t| t.cost)
        .min();
    let recall = (!side.recall_list.is_empty()).then_some(side.recall_cost);
    match (recruit, recall) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Can `leader` still get a `type_id` unit, from the recruit lists or from a
/// recall worth its price?
fn can_obtain(board: &GameBoard, registry: &UnitTypeRegistry, side: SideId, leader: UnitId, type_id: &str) -> bool {
    let (Some(side), Some(leader)) = (board.side(side), board.unit(leader)) else {
        return false;
    };
    side.recruits().iter().chain(&leader.extra_recruits).any(|id| id == type_id)
        || best_recall(registry, side, leader, type_id).is_some()
}

/// On a keep with a free castle hex and something affordable
fn leader_can_recruit(board: &GameBoard, registry: &UnitTypeRegistry, side: &Side, leader: &Unit) -> bool {
    if leader.incapacitated || !board.map().is_keep(leader.location) {
        return false;
    }
    if board.find_vacant_castle(leader.location).is_none() {
        return false;
    }
    match cheapest_option_cost(registry, side, leader) {
        Some(cost) => cost <= 0 || side.gold >= cost,
        None => false,
    }
}

/// Recruitment AI of one side
pub struct Recruitment {
    side: SideId,
    aspects: RecruitmentAspects,
    state: RecruitmentState,
    instructions: RecruitmentInstructions,
    instructions_turn: Option<Turn>,
    estimator: CombatEstimator,
    search: SearchContext,
    rng: ChaCha8Rng,
    own_units_count: BTreeMap<String, u32>,
    total_own_units: u32,
    scouts_wanted: i32,
    important_hexes: ImportantHexes,
}

impl Recruitment {
    /// Create with the default seed
    pub fn new(side: SideId, aspects: RecruitmentAspects) -> Self {
        Self::with_seed(side, aspects, DEFAULT_SEED)
    }

    /// Create with a specific RNG seed for reproducible passes
    pub fn with_seed(side: SideId, aspects: RecruitmentAspects, seed: u64) -> Self {
        Self {
            side,
            estimator: CombatEstimator::new(aspects.combat_cache),
            instructions: aspects.recruitment_instructions.clone(),
            aspects,
            state: RecruitmentState::Normal,
            instructions_turn: None,
            search: SearchContext::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            own_units_count: BTreeMap::new(),
            total_own_units: 0,
            scouts_wanted: 0,
            important_hexes: ImportantHexes::default(),
        }
    }

    pub fn side(&self) -> SideId {
        self.side
    }

    pub fn state(&self) -> RecruitmentState {
        self.state
    }

    pub fn aspects(&self) -> &RecruitmentAspects {
        &self.aspects
    }

    /// Replace the aspects. Jobs are re-read on the next pass.
    pub fn set_aspects(&mut self, aspects: RecruitmentAspects) {
        self.estimator.cache_mut().set_policy(aspects.combat_cache);
        self.aspects = aspects;
        self.instructions_turn = None;
    }

    /// Jobs as left by the last pass
    pub fn instructions(&self) -> &RecruitmentInstructions {
        &self.instructions
    }

    pub fn estimator(&self) -> &CombatEstimator {
        &self.estimator
    }

    pub fn important_hexes(&self) -> &ImportantHexes {
        &self.important_hexes
    }

    pub fn scouts_wanted(&self) -> i32 {
        self.scouts_wanted
    }

    /// `aspects.score` if some leader could recruit now, `BAD_SCORE` otherwise
    pub fn evaluate(&self, board: &GameBoard, registry: &UnitTypeRegistry) -> f64 {
        let Some(side) = board.side(self.side) else {
            return BAD_SCORE;
        };
        if board
            .leaders_of(self.side)
            .any(|leader| leader_can_recruit(board, registry, side, leader))
        {
            self.aspects.score
        } else {
            BAD_SCORE
        }
    }

    /// Run one recruitment pass
    pub fn execute(
        &mut self,
        board: &mut GameBoard,
        registry: &UnitTypeRegistry,
        executor: &mut dyn ActionExecutor,
    ) -> PassReport {
        let turn = board.turn();
        let mut report = PassReport {
            side: self.side,
            turn,
            end: PassEnd::NoLeaders,
            state: self.state,
            actions: Vec::new(),
            failures: Vec::new(),
            leaders_in_danger: Vec::new(),
        };

        self.refresh_instructions(turn);
        self.estimator.begin_pass();
        self.update_own_units_count(board);
        self.update_scouts_wanted(board, registry);

        let mut leaders = self.collect_leaders(board, registry);
        if leaders.is_empty() {
            tracing::debug!("{}: no leader can recruit", self.side);
            self.state = self.state.end_of_pass(false);
            report.state = self.state;
            return report;
        }

        for leader in leaders.iter_mut() {
            if self.leader_in_danger(board, registry, leader.location) {
                tracing::info!("{}: leader {} is in danger", self.side, leader.name);
                leader.in_danger = true;
                leader.ratio_score = LEADER_IN_DANGER_RATIO;
                self.state = RecruitmentState::LeaderInDanger;
                report.leaders_in_danger.push(leader.leader);
            }
        }

        self.score_candidates(board, registry, &mut leaders);

        let (end, ran_out_of_gold) = self.allocate(board, registry, executor, &mut leaders, &mut report);
        report.end = end;

        let next = self.state.end_of_pass(ran_out_of_gold);
        if next != self.state {
            tracing::info!("{}: recruitment state {} -> {}", self.side, self.state, next);
        }
        self.state = next;
        report.state = self.state;
        report
    }

    /// Jobs are re-read once per turn, with the pattern job appended
    fn refresh_instructions(&mut self, turn: Turn) {
        if self.instructions_turn == Some(turn) {
            return;
        }
        let mut instructions = self.aspects.recruitment_instructions.clone();
        if !self.aspects.recruitment_pattern.is_empty() {
            instructions
                .recruit
                .push(RecruitJob::from_pattern(&self.aspects.recruitment_pattern));
        }
        self.instructions = instructions;
        self.instructions_turn = Some(turn);
    }

    fn update_own_units_count(&mut self, board: &GameBoard) {
        self.own_units_count.clear();
        self.total_own_units = 0;
        for unit in board.units_of(self.side).filter(|u| !u.can_recruit) {
            *self.own_units_count.entry(unit.type_id.clone()).or_insert(0) += 1;
            self.total_own_units += 1;
        }
    }

    fn update_scouts_wanted(&mut self, board: &GameBoard, registry: &UnitTypeRegistry) {
        let sides = board.side_count().max(1) as f64;
        let our_share = board.neutral_village_count() as f64 / sides;
        let villages_per_scout = VILLAGE_PER_SCOUT_MULTIPLICATOR * self.aspects.villages_per_scout as f64 / sides;

        self.scouts_wanted = if villages_per_scout > 0.0 {
            (our_share / villages_per_scout).round() as i32
        } else {
            0
        };
        if self.scouts_wanted == 0 {
            return;
        }
        for (type_id, count) in &self.own_units_count {
            if recruit_matches_type(registry, type_id, "scout") {
                self.scouts_wanted -= *count as i32;
            }
        }
    }

    fn collect_leaders(&self, board: &GameBoard, registry: &UnitTypeRegistry) -> Vec<LeaderRecruitmentData> {
        let Some(side) = board.side(self.side) else {
            tracing::warn!("recruitment for unknown {}", self.side);
            return Vec::new();
        };

        let mut leaders = Vec::new();
        for leader in board.leaders_of(self.side) {
            if !leader_can_recruit(board, registry, side, leader) {
                continue;
            }
            let mut recruits: BTreeSet<String> = side
                .recruits()
                .iter()
                .chain(&leader.extra_recruits)
                .filter(|id| registry.contains(id))
                .cloned()
                .collect();
            for unit in &side.recall_list {
                if registry.contains(&unit.type_id)
                    && leader.can_recall(unit)
                    && recall_worth(registry, unit) > side.recall_cost as f64
                {
                    recruits.insert(unit.type_id.clone());
                }
            }
            if recruits.is_empty() {
                continue;
            }
            leaders.push(LeaderRecruitmentData::new(leader, recruits));
        }
        leaders
    }

    /// Can a visible enemy reach a hex next to `leader_loc` this turn?
    fn leader_in_danger(&mut self, board: &GameBoard, registry: &UnitTypeRegistry, leader_loc: Location) -> bool {
        let map = board.map();
        for enemy in board.units() {
            if enemy.incapacitated || enemy.moves == 0 || !board.is_enemy(self.side, enemy.side) {
                continue;
            }
            let reach = enemy.moves + 1;
            if enemy.location.distance(&leader_loc) > reach {
                continue;
            }
            let Some(enemy_type) = registry.find(&enemy.type_id) else {
                continue;
            };
            let calc = MoveCostCalculator::new(board, enemy_type, enemy.side);
            for target in map.adjacent_on_board(leader_loc) {
                if board.unit_at(target).is_some_and(|u| u.id != enemy.id) {
                    continue;
                }
                let route = self.search.search(
                    enemy.location,
                    target,
                    reach as f64,
                    &calc,
                    map.width(),
                    map.height(),
                    None,
                );
                if route.is_reachable() {
                    return true;
                }
            }
        }
        false
    }

    /// Combat analysis, similarity penalty, noise and bonuses
    fn score_candidates(
        &mut self,
        board: &GameBoard,
        registry: &UnitTypeRegistry,
        leaders: &mut [LeaderRecruitmentData],
    ) {
        self.important_hexes = find_important_hexes(
            board,
            registry,
            self.side,
            self.aspects.offensive_shift,
            self.aspects.border_thickness,
        );
        let context = CombatContext {
            important_terrain: self.important_hexes.terrain.clone(),
            average_lawful_bonus: average_lawful_bonus(board.schedule()),
        };

        let enemies = enemy_units(board, registry, self.side);
        analyze_combat(
            leaders,
            &enemies,
            &mut self.estimator,
            registry,
            &context,
            self.aspects.combat_score_power,
            self.aspects.recruitment_diversity,
        );
        apply_similarity_penalty(leaders, registry);
        apply_randomness(leaders, &mut self.rng, self.aspects.recruitment_randomness);
        apply_recruitment_more(leaders, registry, &self.aspects.recruitment_more);

        for leader in leaders.iter() {
            tracing::debug!("{}: scores for {}: {:?}", self.side, leader.name, leader.scores);
        }
    }

    fn update_state(&mut self, board: &GameBoard) {
        if self.state.is_sticky() {
            return;
        }
        let side = self.side;
        let gold = board.side(side).map(|s| s.gold).unwrap_or(0);
        let ratio = unit_ratio(board, side);
        let config = &self.aspects.recruitment_save_gold;
        let next = self.state.transition(config, gold, ratio, || {
            if config.save_on_negative_income {
                1.0
            } else {
                estimated_income(board, side, SAVE_GOLD_FORECAST_TURNS)
            }
        });
        if next != self.state {
            tracing::info!("{}: recruitment state {} -> {} (ratio {:.2})", side, self.state, next, ratio);
            self.state = next;
        }
    }

    /// The allocation loop. Returns why it stopped and whether the last
    /// failure was a lack of gold.
    fn allocate(
        &mut self,
        board: &mut GameBoard,
        registry: &UnitTypeRegistry,
        executor: &mut dyn ActionExecutor,
        leaders: &mut Vec<LeaderRecruitmentData>,
        report: &mut PassReport,
    ) -> (PassEnd, bool) {
        let recruits_version = board.side(self.side).map(|s| s.recruits_version()).unwrap_or(0);
        let mut ran_out_of_gold = false;

        loop {
            let gamestate_version = board.gamestate_version();

            self.update_state(board);
            if self.state == RecruitmentState::SaveGold {
                let active = self.aspects.recruitment_save_gold.active;
                if active > 0 && active <= board.turn() {
                    tracing::info!("{}: saving gold", self.side);
                    return (PassEnd::SavingGold, ran_out_of_gold);
                }
            }

            let Some(job_index) = self.instructions.most_important_job(registry, &self.own_units_count) else {
                return (PassEnd::NoJobs, ran_out_of_gold);
            };
            let job = self.instructions.recruit[job_index].clone();

            let choice = self
                .best_leader(leaders, board, registry, &job)
                .and_then(|index| self.best_recruit(&leaders[index], board, registry, &job).map(|r| (index, r)));
            let Some((leader_index, recruit)) = choice else {
                tracing::debug!("{}: nobody can serve job '{}'", self.side, job.types);
                if self.clear_if_blocker(job_index) {
                    continue;
                }
                return (PassEnd::JobDeferred, ran_out_of_gold);
            };

            let leader = leaders[leader_index].leader;
            let recall = board
                .side(self.side)
                .zip(board.unit(leader))
                .and_then(|(side, leader_unit)| best_recall(registry, side, leader_unit, &recruit));
            let outcome = match recall {
                Some(unit) => executor.execute_recall(board, leader, unit),
                None => executor.execute_recruit(board, leader, &recruit),
            };

            let ActionOutcome::Ok { location } = outcome else {
                let action = if recall.is_some() { "recall" } else { "recruit" };
                tracing::warn!("{}: {} of {} failed: {:?}", self.side, action, recruit, outcome);
                ran_out_of_gold = outcome == ActionOutcome::NoGold;
                report.failures.push(outcome);
                if matches!(outcome, ActionOutcome::NoVacantCastle | ActionOutcome::LeaderNotOnKeep) {
                    // this leader is done; the job stays open for the others
                    leaders.remove(leader_index);
                    continue;
                }
                if self.clear_if_blocker(job_index) {
                    continue;
                }
                return (PassEnd::JobDeferred, ran_out_of_gold);
            };

            tracing::info!(
                "{}: {} {} at {}",
                self.side,
                if recall.is_some() { "recalled" } else { "recruited" },
                recruit,
                location
            );
            report.actions.push(RecruitmentAction {
                leader,
                type_id: recruit.clone(),
                recalled: recall,
                location,
            });

            leaders[leader_index].recruit_count += 1;
            *self.own_units_count.entry(recruit.clone()).or_insert(0) += 1;
            self.total_own_units += 1;
            if recruit_matches_type(registry, &recruit, "scout") {
                self.scouts_wanted -= 1;
            }
            if !job.total {
                self.instructions.recruit[job_index].number -= 1;
            }

            let list_changed = board
                .side(self.side)
                .is_some_and(|s| s.recruits_version() != recruits_version);
            if list_changed {
                tracing::debug!("{}: recruit list changed, stopping", self.side);
                return (PassEnd::RecruitListChanged, ran_out_of_gold);
            }
            if board.gamestate_version().saturating_sub(gamestate_version) > 1 {
                tracing::debug!("{}: game state changed behind the pass, stopping", self.side);
                return (PassEnd::GamestateChanged, ran_out_of_gold);
            }
        }
    }

    /// Blocker jobs that cannot be served are dropped for the turn
    fn clear_if_blocker(&mut self, job_index: usize) -> bool {
        let Some(job) = self.instructions.recruit.get_mut(job_index) else {
            return false;
        };
        if !job.blocker {
            return false;
        }
        tracing::debug!("{}: dropping job '{}'", self.side, job.types);
        job.clear();
        true
    }

    /// Within the limits and still obtainable by `leader`
    fn candidate_open(
        &self,
        leader: &LeaderRecruitmentData,
        board: &GameBoard,
        registry: &UnitTypeRegistry,
        recruit: &str,
    ) -> bool {
        self.instructions.limit_ok(registry, recruit, &self.own_units_count)
            && can_obtain(board, registry, self.side, leader.leader, recruit)
    }

    fn leader_matches_job(
        &self,
        leader: &LeaderRecruitmentData,
        board: &GameBoard,
        registry: &UnitTypeRegistry,
        job: &RecruitJob,
    ) -> bool {
        job.matches_leader(&leader.name)
            && leader.recruits.iter().any(|recruit| {
                job.matches_recruit(registry, recruit) && self.candidate_open(leader, board, registry, recruit)
            })
    }

    /// The leader furthest below its share of the recruits
    fn best_leader(
        &mut self,
        leaders: &[LeaderRecruitmentData],
        board: &GameBoard,
        registry: &UnitTypeRegistry,
        job: &RecruitJob,
    ) -> Option<usize> {
        let ratio_sum: f64 = leaders.iter().map(|l| l.ratio_score).sum();
        let recruited: u32 = leaders.iter().map(|l| l.recruit_count).sum();

        let mut order: Vec<usize> = (0..leaders.len()).collect();
        order.shuffle(&mut self.rng);

        let mut best: Option<(usize, f64)> = None;
        for index in order {
            let leader = &leaders[index];
            if !self.leader_matches_job(leader, board, registry, job) {
                continue;
            }
            let desired = leader.ratio_score / ratio_sum * (recruited + 1) as f64;
            let difference = desired - leader.recruit_count as f64;
            if best.map_or(true, |(_, biggest)| difference > biggest) {
                best = Some((index, difference));
            }
        }
        best.map(|(index, _)| index)
    }

    fn best_recruit(
        &mut self,
        leader: &LeaderRecruitmentData,
        board: &GameBoard,
        registry: &UnitTypeRegistry,
        job: &RecruitJob,
    ) -> Option<String> {
        if !job.pattern {
            return self.best_recruit_matching(leader, board, registry, &job.type_patterns());
        }
        let mut entries = job.type_patterns();
        entries.retain(|pattern| {
            leader.recruits.iter().any(|recruit| {
                recruit_matches_type(registry, recruit, pattern) && self.candidate_open(leader, board, registry, recruit)
            })
        });
        let chosen = *entries.choose(&mut self.rng)?;
        tracing::debug!("{}: pattern picked '{}'", self.side, chosen);
        self.best_recruit_matching(leader, board, registry, &[chosen])
    }

    /// The candidate furthest below its share of the army
    fn best_recruit_matching(
        &self,
        leader: &LeaderRecruitmentData,
        board: &GameBoard,
        registry: &UnitTypeRegistry,
        patterns: &[&str],
    ) -> Option<String> {
        let mut best: Option<(String, f64)> = None;
        for (recruit, score) in leader.normalized_scores() {
            if !self.candidate_open(leader, board, registry, &recruit) {
                continue;
            }
            if !recruit_matches_types(registry, &recruit, patterns) {
                continue;
            }
            let desired = score * (self.total_own_units + 1) as f64;
            let current = self.own_units_count.get(&recruit).copied().unwrap_or(0) as f64;
            let mut difference = desired - current;
            if self.scouts_wanted > 0 && recruit_matches_type(registry, &recruit, "scout") {
                difference += SCOUT_BONUS;
            }
            if best.as_ref().map_or(true, |(_, biggest)| difference > *biggest) {
                best = Some((recruit, difference));
            }
        }
        best.map(|(recruit, _)| recruit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardActions;
    use crate::core::config::SaveGoldConfig;
    use crate::core::types::TeamId;
    use crate::map::{GameMap, Terrain};
    use crate::recruitment::instructions::RecruitLimit;
    use crate::units::UnitType;

    fn unit_type(id: &str, cost: Gold, hitpoints: u32, moves: u32, usage: &str) -> UnitType {
        let mut unit_type = UnitType::new(id, cost, hitpoints, moves);
        unit_type.usage = usage.into();
        for terrain in Terrain::ALL {
            unit_type.movement_costs.insert(terrain, 1);
        }
        unit_type
    }

    fn registry() -> UnitTypeRegistry {
        let mut registry = UnitTypeRegistry::new();
        registry.add(unit_type("Lieutenant", 32, 40, 6, "fighter"));
        let mut spearman = unit_type("Spearman", 14, 36, 5, "fighter");
        spearman.advances_to = vec!["Swordsman".into()];
        registry.add(spearman);
        registry.add(unit_type("Swordsman", 25, 55, 5, "fighter"));
        registry.add(unit_type("Archer", 14, 29, 5, "archer"));
        registry.add(unit_type("Scout", 13, 32, 8, "scout"));
        registry.add(unit_type("Grunt", 12, 38, 5, "fighter"));
        registry.add(unit_type("Mage", 20, 24, 5, "mixed fighter"));
        registry
    }

    /// Keep at (1,1) with castle hexes (0,1) and (2,1)
    const TWO_CASTLES: &str = "
        . . . . . . . . . . . .
        C K C . . . . . . . . .
        . . . . . . . . . . . .
    ";

    /// Keep at (1,1) with the single castle hex (2,1)
    const ONE_CASTLE: &str = "
        . . . . . .
        . K C . . .
        . . . . . .
    ";

    fn setup(layout: &str, gold: Gold, recruits: &[&str]) -> (GameBoard, UnitId) {
        let registry = registry();
        let mut board = GameBoard::new(GameMap::from_ascii(layout).unwrap());
        board
            .add_side(Side::new(SideId(1), TeamId(1), gold).with_recruits(recruits))
            .unwrap();
        board.add_side(Side::new(SideId(2), TeamId(2), 0)).unwrap();
        let leader = board
            .spawn_leader(registry.find("Lieutenant").unwrap(), SideId(1), Location::new(1, 1), "Gweddry")
            .unwrap();
        (board, leader)
    }

    /// No noise and no gold saving
    fn quiet_aspects() -> RecruitmentAspects {
        let mut aspects = RecruitmentAspects {
            recruitment_randomness: 0.0,
            ..RecruitmentAspects::default()
        };
        aspects.recruitment_save_gold.active = 0;
        aspects
    }

    fn run(engine: &mut Recruitment, board: &mut GameBoard, registry: &UnitTypeRegistry) -> PassReport {
        let mut actions = BoardActions::new(registry);
        engine.execute(board, registry, &mut actions)
    }

    #[test]
    fn test_evaluate() {
        let registry = registry();
        let engine = Recruitment::new(SideId(1), RecruitmentAspects::default());

        let (board, _) = setup(ONE_CASTLE, 100, &["Spearman"]);
        assert_eq!(engine.evaluate(&board, &registry), 180_000.0);

        let (board, _) = setup(ONE_CASTLE, 10, &["Spearman"]);
        assert_eq!(engine.evaluate(&board, &registry), BAD_SCORE);

        let (mut board, leader) = setup(ONE_CASTLE, 100, &["Spearman"]);
        board.unit_mut(leader).unwrap().location = Location::new(4, 1);
        assert_eq!(engine.evaluate(&board, &registry), BAD_SCORE);

        let (mut board, _) = setup(ONE_CASTLE, 100, &["Spearman"]);
        board
            .spawn_unit(registry.find("Grunt").unwrap(), SideId(2), Location::new(2, 1))
            .unwrap();
        assert_eq!(engine.evaluate(&board, &registry), BAD_SCORE);

        let (board, _) = setup(ONE_CASTLE, 100, &[]);
        assert_eq!(engine.evaluate(&board, &registry), BAD_SCORE);
    }

    #[test]
    fn test_free_units_are_always_affordable() {
        let mut registry = registry();
        registry.add(unit_type("Peasant", 0, 18, 5, "fighter"));
        let engine = Recruitment::new(SideId(1), RecruitmentAspects::default());
        let (board, _) = setup(ONE_CASTLE, 0, &["Peasant"]);
        assert_eq!(engine.evaluate(&board, &registry), 180_000.0);
    }

    #[test]
    fn test_single_castle_recruits_once() {
        let registry = registry();
        let (mut board, _) = setup(ONE_CASTLE, 1000, &["Spearman", "Archer", "Scout"]);
        let mut engine = Recruitment::with_seed(SideId(1), RecruitmentAspects::default(), 7);

        let report = run(&mut engine, &mut board, &registry);
        assert_eq!(report.actions.len(), 1);
        let recruited = &report.actions[0].type_id;
        let cost = registry.find(recruited).unwrap().cost;
        assert_eq!(board.side(SideId(1)).unwrap().gold, 1000 - cost);
        assert_eq!(board.vacant_castle_count(Location::new(1, 1)), 0);
        assert_eq!(report.failures, vec![ActionOutcome::NoVacantCastle]);
        assert_eq!(report.end, PassEnd::NoJobs);
    }

    #[test]
    fn test_blocker_job_is_cleared() {
        let registry = registry();
        let (mut board, _) = setup(ONE_CASTLE, 100, &["Spearman"]);
        let mut aspects = quiet_aspects();
        aspects.recruitment_instructions.recruit = vec![
            RecruitJob::new("Mage").with_importance(5),
            RecruitJob::default(),
        ];
        let mut engine = Recruitment::new(SideId(1), aspects);

        let report = run(&mut engine, &mut board, &registry);
        assert!(engine.instructions().recruit[0].is_cleared());
        assert_eq!(report.actions.len(), 1);
        assert_eq!(report.actions[0].type_id, "Spearman");
    }

    #[test]
    fn test_non_blocker_job_defers_the_pass() {
        let registry = registry();
        let (mut board, _) = setup(ONE_CASTLE, 100, &["Spearman"]);
        let mut aspects = quiet_aspects();
        aspects.recruitment_instructions.recruit = vec![
            RecruitJob::new("Mage").with_importance(5).with_blocker(false),
            RecruitJob::default(),
        ];
        let mut engine = Recruitment::new(SideId(1), aspects);

        let report = run(&mut engine, &mut board, &registry);
        assert_eq!(report.end, PassEnd::JobDeferred);
        assert!(report.actions.is_empty());
        assert!(!engine.instructions().recruit[0].is_cleared());
        assert_eq!(board.side(SideId(1)).unwrap().gold, 100);
    }

    #[test]
    fn test_job_number_is_a_quota() {
        let registry = registry();
        let (mut board, _) = setup(TWO_CASTLES, 100, &["Spearman"]);
        let mut aspects = quiet_aspects();
        aspects.recruitment_instructions.recruit = vec![RecruitJob::default().with_number(1)];
        let mut engine = Recruitment::new(SideId(1), aspects);

        let report = run(&mut engine, &mut board, &registry);
        assert_eq!(report.actions.len(), 1);
        assert_eq!(engine.instructions().recruit[0].number, 0);

        // same turn: the quota stays used up
        let report = run(&mut engine, &mut board, &registry);
        assert!(report.actions.is_empty());

        board.advance_turn();
        let report = run(&mut engine, &mut board, &registry);
        assert_eq!(report.actions.len(), 1);
    }

    #[test]
    fn test_scout_wanted_wins() {
        let registry = registry();
        let layout = "
            v v v v . .
            C K C . . .
            . . . . . .
        ";
        let (mut board, _) = setup(layout, 100, &["Spearman", "Archer", "Scout"]);
        let mut engine = Recruitment::new(SideId(1), quiet_aspects());

        let report = run(&mut engine, &mut board, &registry);
        let types: Vec<&str> = report.actions.iter().map(|a| a.type_id.as_str()).collect();
        assert_eq!(types, vec!["Scout", "Archer"]);
    }

    #[test]
    fn test_scouts_wanted_ignores_side_count() {
        let registry = registry();
        let layout = "
            v v v v v v v v
            C K C . . . . .
            . . . . . . . .
        ";
        let wanted = |extra_sides: u32| {
            let (mut board, _) = setup(layout, 100, &["Spearman"]);
            for id in 3..3 + extra_sides {
                board.add_side(Side::new(SideId(id), TeamId(id), 0)).unwrap();
            }
            let mut engine = Recruitment::new(SideId(1), quiet_aspects());
            run(&mut engine, &mut board, &registry);
            engine.scouts_wanted()
        };
        // 8 neutral villages, 4 per scout, doubled
        assert_eq!(wanted(0), 1);
        assert_eq!(wanted(2), 1);
    }

    #[test]
    fn test_limit_blocks_type() {
        let registry = registry();
        let layout = "
            v v v v . .
            C K C . . .
            . . . . . .
        ";
        let (mut board, _) = setup(layout, 100, &["Spearman", "Archer", "Scout"]);
        let mut aspects = quiet_aspects();
        aspects.recruitment_instructions.limit = vec![RecruitLimit {
            types: "scout".into(),
            id: None,
            max: 0,
        }];
        let mut engine = Recruitment::new(SideId(1), aspects);

        let report = run(&mut engine, &mut board, &registry);
        assert!(report.actions.iter().all(|a| a.type_id != "Scout"));
        assert_eq!(report.actions.len(), 2);
    }

    #[test]
    fn test_pattern_job_picks_from_pattern() {
        let registry = registry();
        let (mut board, _) = setup(TWO_CASTLES, 100, &["Spearman", "Archer", "Scout"]);
        let mut aspects = quiet_aspects();
        aspects.recruitment_pattern = vec!["archer".into()];
        let mut engine = Recruitment::new(SideId(1), aspects);

        let report = run(&mut engine, &mut board, &registry);
        assert_eq!(engine.instructions().recruit.len(), 2);
        assert!(engine.instructions().recruit[1].pattern);
        let types: Vec<&str> = report.actions.iter().map(|a| a.type_id.as_str()).collect();
        assert_eq!(types, vec!["Archer", "Archer"]);
    }

    #[test]
    fn test_veteran_is_recalled() {
        let registry = registry();
        let (mut board, _) = setup(ONE_CASTLE, 100, &["Spearman"]);
        let mut veteran = Unit::from_type(UnitId(0), registry.find("Spearman").unwrap(), SideId(1), Location::NULL);
        veteran.experience = 50;
        let veteran = board.add_to_recall_list(SideId(1), veteran).unwrap();

        let side = board.side(SideId(1)).unwrap();
        // 14 + 0.5 * 25
        assert_eq!(recall_worth(&registry, &side.recall_list[0]), 26.5);

        let mut engine = Recruitment::new(SideId(1), quiet_aspects());
        let report = run(&mut engine, &mut board, &registry);
        assert_eq!(report.actions[0].recalled, Some(veteran));
        assert_eq!(board.side(SideId(1)).unwrap().gold, 80);
    }

    #[test]
    fn test_green_recall_unit_is_not_worth_it() {
        let registry = registry();
        let (mut board, _) = setup(ONE_CASTLE, 100, &["Spearman"]);
        let rookie = Unit::from_type(UnitId(0), registry.find("Spearman").unwrap(), SideId(1), Location::NULL);
        board.add_to_recall_list(SideId(1), rookie).unwrap();

        let mut engine = Recruitment::new(SideId(1), quiet_aspects());
        let report = run(&mut engine, &mut board, &registry);
        assert_eq!(report.actions[0].recalled, None);
        assert_eq!(board.side(SideId(1)).unwrap().gold, 86);
    }

    #[test]
    fn test_recall_filter_hides_unit() {
        let registry = registry();
        let (mut board, leader) = setup(ONE_CASTLE, 100, &[]);
        let mut veteran = Unit::from_type(UnitId(0), registry.find("Mage").unwrap(), SideId(1), Location::NULL);
        veteran.experience = 90;
        board.add_to_recall_list(SideId(1), veteran).unwrap();
        board.unit_mut(leader).unwrap().recall_filter = vec!["fighter".into()];

        let side = board.side(SideId(1)).unwrap();
        let leader_unit = board.unit(leader).unwrap();
        assert_eq!(best_recall(&registry, side, leader_unit, "Mage"), None);

        let mut engine = Recruitment::new(SideId(1), quiet_aspects());
        let report = run(&mut engine, &mut board, &registry);
        assert_eq!(report.end, PassEnd::NoLeaders);
    }

    #[test]
    fn test_recall_only_type_is_dropped_once_recalled() {
        let registry = registry();
        let (mut board, _) = setup(TWO_CASTLES, 100, &["Spearman"]);
        let mut veteran = Unit::from_type(UnitId(0), registry.find("Mage").unwrap(), SideId(1), Location::NULL);
        veteran.experience = 50;
        let veteran = board.add_to_recall_list(SideId(1), veteran).unwrap();

        let mut aspects = quiet_aspects();
        aspects.recruitment_more = vec!["Mage".into()];
        let mut engine = Recruitment::new(SideId(1), aspects);

        let report = run(&mut engine, &mut board, &registry);
        let made: Vec<(&str, Option<UnitId>)> = report
            .actions
            .iter()
            .map(|a| (a.type_id.as_str(), a.recalled))
            .collect();
        assert_eq!(made, vec![("Mage", Some(veteran)), ("Spearman", None)]);
        assert!(!report.failures.contains(&ActionOutcome::CannotRecruitType));
        assert_eq!(board.side(SideId(1)).unwrap().gold, 100 - 20 - 14);
        assert_eq!(board.vacant_castle_count(Location::new(1, 1)), 0);
    }

    #[test]
    fn test_save_gold_stops_recruiting() {
        let registry = registry();
        let (mut board, _) = setup(TWO_CASTLES, 100, &["Spearman"]);
        let spearman = registry.find("Spearman").unwrap();
        board.spawn_unit(spearman, SideId(1), Location::new(4, 0)).unwrap();
        board.spawn_unit(spearman, SideId(1), Location::new(4, 2)).unwrap();
        board
            .spawn_unit(registry.find("Grunt").unwrap(), SideId(2), Location::new(11, 2))
            .unwrap();
        board.advance_turn();

        let mut aspects = quiet_aspects();
        aspects.recruitment_save_gold = SaveGoldConfig {
            save_on_negative_income: true,
            ..SaveGoldConfig::default()
        };
        let mut engine = Recruitment::new(SideId(1), aspects);

        let report = run(&mut engine, &mut board, &registry);
        assert_eq!(report.end, PassEnd::SavingGold);
        assert_eq!(report.state, RecruitmentState::SaveGold);
        assert!(report.actions.is_empty());
    }

    #[test]
    fn test_save_gold_inactive_on_first_turn() {
        let registry = registry();
        let (mut board, _) = setup(TWO_CASTLES, 100, &["Spearman"]);
        let spearman = registry.find("Spearman").unwrap();
        board.spawn_unit(spearman, SideId(1), Location::new(4, 0)).unwrap();
        board.spawn_unit(spearman, SideId(1), Location::new(4, 2)).unwrap();
        board
            .spawn_unit(registry.find("Grunt").unwrap(), SideId(2), Location::new(11, 2))
            .unwrap();

        let mut aspects = quiet_aspects();
        aspects.recruitment_save_gold = SaveGoldConfig {
            save_on_negative_income: true,
            ..SaveGoldConfig::default()
        };
        let mut engine = Recruitment::new(SideId(1), aspects);

        let report = run(&mut engine, &mut board, &registry);
        assert_eq!(report.state, RecruitmentState::SaveGold);
        assert!(!report.actions.is_empty());
    }

    #[test]
    fn test_spend_all_gold_falls_back_to_save_gold() {
        let registry = registry();
        let (mut board, _) = setup(TWO_CASTLES, 20, &["Spearman"]);
        let mut aspects = quiet_aspects();
        aspects.recruitment_save_gold.spend_all_gold = 10.0;
        let mut engine = Recruitment::new(SideId(1), aspects);

        let report = run(&mut engine, &mut board, &registry);
        assert_eq!(report.actions.len(), 1);
        assert_eq!(report.failures, vec![ActionOutcome::NoGold]);
        assert_eq!(report.state, RecruitmentState::SaveGold);
    }

    #[test]
    fn test_leader_in_danger() {
        let registry = registry();
        let (mut board, leader) = setup(TWO_CASTLES, 100, &["Spearman"]);
        board
            .spawn_unit(registry.find("Grunt").unwrap(), SideId(2), Location::new(5, 1))
            .unwrap();
        let mut engine = Recruitment::new(SideId(1), quiet_aspects());

        let report = run(&mut engine, &mut board, &registry);
        assert_eq!(report.leaders_in_danger, vec![leader]);
        // danger only lasts for the pass
        assert_eq!(report.state, RecruitmentState::Normal);
        assert_eq!(report.actions.len(), 2);
    }

    #[test]
    fn test_distant_enemy_is_no_danger() {
        let registry = registry();
        let (mut board, _) = setup(TWO_CASTLES, 100, &["Spearman"]);
        board
            .spawn_unit(registry.find("Grunt").unwrap(), SideId(2), Location::new(11, 1))
            .unwrap();
        let mut engine = Recruitment::new(SideId(1), quiet_aspects());

        let report = run(&mut engine, &mut board, &registry);
        assert!(report.leaders_in_danger.is_empty());
    }

    /// Adds a recruit to the side after every successful recruit
    struct ListChanger<'a>(BoardActions<'a>);

    impl ActionExecutor for ListChanger<'_> {
        fn check_recruit(&self, board: &GameBoard, leader: UnitId, type_id: &str) -> ActionOutcome {
            self.0.check_recruit(board, leader, type_id)
        }

        fn check_recall(&self, board: &GameBoard, leader: UnitId, unit: UnitId) -> ActionOutcome {
            self.0.check_recall(board, leader, unit)
        }

        fn execute_recruit(&mut self, board: &mut GameBoard, leader: UnitId, type_id: &str) -> ActionOutcome {
            let outcome = self.0.execute_recruit(board, leader, type_id);
            if let Some(side) = board.side_mut(SideId(1)) {
                side.add_recruit("Mage");
            }
            outcome
        }

        fn execute_recall(&mut self, board: &mut GameBoard, leader: UnitId, unit: UnitId) -> ActionOutcome {
            self.0.execute_recall(board, leader, unit)
        }
    }

    /// Touches the leader after every recruit
    struct Meddler<'a>(BoardActions<'a>);

    impl ActionExecutor for Meddler<'_> {
        fn check_recruit(&self, board: &GameBoard, leader: UnitId, type_id: &str) -> ActionOutcome {
            self.0.check_recruit(board, leader, type_id)
        }

        fn check_recall(&self, board: &GameBoard, leader: UnitId, unit: UnitId) -> ActionOutcome {
            self.0.check_recall(board, leader, unit)
        }

        fn execute_recruit(&mut self, board: &mut GameBoard, leader: UnitId, type_id: &str) -> ActionOutcome {
            let outcome = self.0.execute_recruit(board, leader, type_id);
            if let Some(unit) = board.unit_mut(leader) {
                unit.experience += 1;
            }
            outcome
        }

        fn execute_recall(&mut self, board: &mut GameBoard, leader: UnitId, unit: UnitId) -> ActionOutcome {
            self.0.execute_recall(board, leader, unit)
        }
    }

    #[test]
    fn test_recruit_list_change_stops_pass() {
        let registry = registry();
        let (mut board, _) = setup(TWO_CASTLES, 100, &["Spearman"]);
        let mut engine = Recruitment::new(SideId(1), quiet_aspects());
        let mut executor = ListChanger(BoardActions::new(&registry));

        let report = engine.execute(&mut board, &registry, &mut executor);
        assert_eq!(report.end, PassEnd::RecruitListChanged);
        assert_eq!(report.actions.len(), 1);
    }

    #[test]
    fn test_side_effects_stop_pass() {
        let registry = registry();
        let (mut board, _) = setup(TWO_CASTLES, 100, &["Spearman"]);
        let mut engine = Recruitment::new(SideId(1), quiet_aspects());
        let mut executor = Meddler(BoardActions::new(&registry));

        let report = engine.execute(&mut board, &registry, &mut executor);
        assert_eq!(report.end, PassEnd::GamestateChanged);
        assert_eq!(report.actions.len(), 1);
    }

    #[test]
    fn test_same_seed_same_pass() {
        let registry = registry();
        let (board, _) = setup(TWO_CASTLES, 100, &["Spearman", "Archer", "Scout"]);
        let mut first_board = board.clone();
        let mut second_board = board;

        let mut first = Recruitment::with_seed(SideId(1), RecruitmentAspects::default(), 99);
        let mut second = Recruitment::with_seed(SideId(1), RecruitmentAspects::default(), 99);
        let a = run(&mut first, &mut first_board, &registry);
        let b = run(&mut second, &mut second_board, &registry);
        assert_eq!(a, b);
    }

    #[test]
    fn test_average_advancement_cost() {
        let registry = registry();
        assert_eq!(average_advancement_cost(&registry, "Spearman"), 25.0);
        assert_eq!(average_advancement_cost(&registry, "Archer"), 14.0);
        assert_eq!(average_advancement_cost(&registry, "Dragon"), 0.0);
    }
}
