//! Headless Skirmish Runner
//!
//! Two recruitment AIs on a small two-keep map. Each turn every side runs a
//! recruitment pass, its new units march towards the enemy keep grabbing
//! villages, and income is paid. Prints the pass reports as JSON or text.

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use keep_recruiter::board::{BoardActions, GameBoard, Side};
use keep_recruiter::core::error::{RecruitError, Result};
use keep_recruiter::core::{Gold, RecruitmentAspects, SideId, TeamId, Turn, UnitId};
use keep_recruiter::map::{GameMap, Location};
use keep_recruiter::pathfinding::{flood, MoveCostCalculator};
use keep_recruiter::recruitment::constants::{BASE_INCOME, VILLAGE_INCOME, VILLAGE_SUPPORT};
use keep_recruiter::recruitment::state::side_upkeep;
use keep_recruiter::recruitment::{PassReport, Recruitment};
use keep_recruiter::units::UnitTypeRegistry;

const SKIRMISH_MAP: &str = "
    . . v . f f . . . . f f . v . .
    . C C . . f . h h . f . . C C .
    . C K . . . v . . v . . . K C .
    . C C . f . . m m . . f . C C .
    v . . . f . h . . h . f . . . v
    . . . . . . v . . v . . . . . .
    . f . v . . . . . . . . v . f .
";

/// Headless skirmish - two recruitment AIs, no fighting
#[derive(Parser, Debug)]
#[command(name = "keep-recruiter")]
#[command(about = "Run recruitment passes for two sides and print what they recruit")]
struct Args {
    /// Unit roster (TOML, [[unit_type]] tables)
    #[arg(long, default_value = "data/roster.toml")]
    roster: PathBuf,

    /// Recruitment aspects for both sides (TOML); stock settings if omitted
    #[arg(long)]
    aspects: Option<PathBuf>,

    /// Turns to play
    #[arg(long, default_value_t = 6)]
    turns: Turn,

    /// Starting gold of each side
    #[arg(long, default_value_t = 100)]
    gold: Gold,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// One side's setup
struct Faction {
    side: SideId,
    leader_type: &'static str,
    leader_name: &'static str,
    keep: Location,
    recruits: &'static [&'static str],
}

const FACTIONS: [Faction; 2] = [
    Faction {
        side: SideId(1),
        leader_type: "Lieutenant",
        leader_name: "Gweddry",
        keep: Location::new(2, 2),
        recruits: &["Spearman", "Bowman", "Cavalryman", "Mage", "Heavy Infantryman", "Fencer"],
    },
    Faction {
        side: SideId(2),
        leader_type: "Orcish Warrior",
        leader_name: "Kapou'e",
        keep: Location::new(13, 2),
        recruits: &["Orcish Grunt", "Troll Whelp", "Wolf Rider", "Orcish Archer", "Orcish Assassin"],
    },
];

#[derive(Serialize)]
struct SkirmishResult {
    seed: u64,
    turns: Vec<TurnResult>,
    final_gold: Vec<(SideId, Gold)>,
}

#[derive(Serialize)]
struct TurnResult {
    turn: Turn,
    passes: Vec<PassReport>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("keep_recruiter=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let registry = UnitTypeRegistry::load(&args.roster)?;
    let aspects = match &args.aspects {
        Some(path) => RecruitmentAspects::load(path)?,
        None => RecruitmentAspects::default(),
    };

    let mut board = setup_board(&registry, args.gold)?;
    let mut engines: Vec<Recruitment> = FACTIONS
        .iter()
        .enumerate()
        .map(|(i, f)| Recruitment::with_seed(f.side, aspects.clone(), seed.wrapping_add(i as u64)))
        .collect();

    tracing::info!("skirmish starting: {} turns, seed {}", args.turns, seed);

    let mut result = SkirmishResult {
        seed,
        turns: Vec::new(),
        final_gold: Vec::new(),
    };
    for _ in 0..args.turns {
        let mut turn = TurnResult {
            turn: board.turn(),
            passes: Vec::new(),
        };
        for engine in engines.iter_mut() {
            let side = engine.side();
            if engine.evaluate(&board, &registry) > 0.0 {
                let mut actions = BoardActions::new(&registry);
                turn.passes.push(engine.execute(&mut board, &registry, &mut actions));
            }
            march(&mut board, &registry, side)?;
            pay_income(&mut board, side);
        }
        result.turns.push(turn);
        board.advance_turn();
    }
    result.final_gold = board.sides().map(|s| (s.id, s.gold)).collect();

    match args.format.as_str() {
        "text" => print_text(&result),
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        other => {
            eprintln!("Unknown format '{}', defaulting to json", other);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}

fn setup_board(registry: &UnitTypeRegistry, gold: Gold) -> Result<GameBoard> {
    let mut board = GameBoard::new(GameMap::from_ascii(SKIRMISH_MAP)?);
    for faction in &FACTIONS {
        board.add_side(Side::new(faction.side, TeamId(faction.side.0), gold).with_recruits(faction.recruits))?;
        let leader_type = registry.get(faction.leader_type)?;
        board.spawn_leader(leader_type, faction.side, faction.keep, faction.leader_name)?;
    }
    Ok(board)
}

/// Move every non-leader unit of `side` as far towards the enemy keep as it
/// can this turn, stopping early on a village it does not own.
fn march(board: &mut GameBoard, registry: &UnitTypeRegistry, side: SideId) -> Result<()> {
    let target = FACTIONS
        .iter()
        .find(|f| f.side != side)
        .map(|f| f.keep)
        .ok_or_else(|| RecruitError::InvalidState("no enemy faction".into()))?;

    let movers: Vec<UnitId> = board.units_of(side).filter(|u| u.is_fighting_unit()).map(|u| u.id).collect();
    for id in movers {
        let Some(unit) = board.unit(id) else {
            continue;
        };
        let unit_type = registry.get(&unit.type_id)?;
        let map = board.map();
        let calc = MoveCostCalculator::new(board, unit_type, side);
        let reach = flood(&calc, unit.location, map.width(), map.height(), unit.moves as f64 + 1.0);

        let destination = reach
            .reached()
            .map(|(loc, _)| loc)
            .filter(|loc| *loc == unit.location || !board.is_occupied(*loc))
            .min_by_key(|loc| {
                let grab = map.is_village(*loc) && board.village_owner(*loc) != Some(side);
                (!grab, loc.distance(&target))
            });
        let Some(destination) = destination else {
            continue;
        };
        if destination == unit.location {
            continue;
        }
        if let Some(unit) = board.unit_mut(id) {
            unit.location = destination;
        }
        if board.map().is_village(destination) {
            board.set_village_owner(destination, Some(side))?;
        }
    }
    Ok(())
}

fn pay_income(board: &mut GameBoard, side: SideId) {
    let villages = board.village_count(side) as f64;
    let unpaid_upkeep = (side_upkeep(board, side) - villages * VILLAGE_SUPPORT).max(0.0);
    let income = (BASE_INCOME + villages * VILLAGE_INCOME - unpaid_upkeep) as Gold;
    if let Some(entry) = board.side_mut(side) {
        entry.gold += income;
        tracing::debug!("{}: income {}, gold {}", side, income, entry.gold);
    }
}

fn print_text(result: &SkirmishResult) {
    println!("Skirmish Result");
    println!("===============");
    for turn in &result.turns {
        println!("Turn {}", turn.turn);
        for pass in &turn.passes {
            let recruited: Vec<String> = pass
                .actions
                .iter()
                .map(|a| match a.recalled {
                    Some(_) => format!("{} (recalled)", a.type_id),
                    None => a.type_id.clone(),
                })
                .collect();
            println!(
                "  {}: [{}] state={} end={:?}",
                pass.side,
                recruited.join(", "),
                pass.state,
                pass.end
            );
        }
    }
    println!();
    for (side, gold) in &result.final_gold {
        println!("{} gold: {}", side, gold);
    }
    println!("Seed: {}", result.seed);
}
