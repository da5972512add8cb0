//! Headless squad simulation
//!
//! Runs a commander with a fire team, an assault pair closing on an
//! enemy, and a marksman working cover, then prints where everyone
//! ended up and who holds which slot.

use std::path::PathBuf;

use clap::Parser;
use glam::Vec3;
use squad_command::behavior::communicate::Source;
use squad_command::behavior::memory::{COMMANDER, ENEMY, MOVE_TARGET, TEAM_COMM};
use squad_command::behavior::{
    ActionResult, AttackPosition, Communicate, CoverFaceDirection, DetectEnemy, FindCoverPoint, FormationFollow,
    PatrolSpeed, TakeCommand,
};
use squad_command::core::config::{config, load_config};
use squad_command::core::error::Result;
use squad_command::core::types::{EntityId, ReferenceFrame};
use squad_command::navigation::{GridCell, NavGrid};
use squad_command::simulation::{SimulationEvent, SquadSimulation, SquadSummary};
use tracing_subscriber::EnvFilter;

/// Headless squad runner
#[derive(Parser, Debug)]
#[command(name = "squad_sim")]
#[command(about = "Run a scripted squad scenario and report formation state")]
struct Args {
    /// Ticks to simulate
    #[arg(long, default_value_t = 300)]
    ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.1)]
    delta_time: f32,

    /// Random seed for scattered layouts
    #[arg(long)]
    seed: Option<u64>,

    /// TOML config file (defaults built in)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Commander harness to switch to halfway through
    #[arg(long)]
    formation: Option<String>,

    /// Formation mode applied along with the switch
    #[arg(long)]
    mode: Option<String>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

struct Roster {
    commander: EntityId,
    enemy: EntityId,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("squad_command=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => config().clone(),
    };

    tracing::info!("Squad simulation starting (seed {})", seed);
    let mut sim = SquadSimulation::new(config, seed);
    let roster = setup_scenario(&mut sim);

    let halfway = args.ticks / 2;
    let mut failures = 0;
    for tick in 0..args.ticks {
        if tick == halfway {
            switch_formation(&mut sim, roster.commander, &args);
        }
        for event in sim.tick(args.delta_time) {
            let SimulationEvent::BehaviorFinished { result, .. } = event;
            if result == ActionResult::Failure {
                failures += 1;
            }
        }
    }

    let summary = SquadSummary::capture(&sim);
    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => print_text(&summary, &sim, roster.enemy, failures),
    }
    Ok(())
}

fn setup_scenario(sim: &mut SquadSimulation) -> Roster {
    let follow_strategy = sim.config().follow_strategy;
    let attack_strategy = sim.config().attack_strategy;

    // 80 x 80 m of ground with a wall in front of the enemy
    let mut grid = NavGrid::new(80, 80, 1.0, Vec3::new(-40.0, 0.0, -20.0));
    grid.block_rect(GridCell::new(44, 52), GridCell::new(56, 53));
    sim.world.set_nav_grid(grid);

    let enemy = sim.world.spawn_body("Hostile", ReferenceFrame::from_yaw_degrees(Vec3::new(12.0, 0.0, 45.0), 180.0));
    sim.world.set_team(enemy, Some("red"));
    sim.world.add_threat_area(Vec3::new(12.0, 0.0, 45.0));
    for x in [-6.0, 0.0, 6.0] {
        sim.world.add_cover_point(Vec3::new(x, 0.0, 30.0));
    }

    let commander = sim.spawn_agent("Sergeant", ReferenceFrame::default());
    sim.set_team(commander, Some("blue"));
    if let Some(agent) = sim.agent_mut(commander) {
        agent.memory.set(MOVE_TARGET, Vec3::new(0.0, 0.0, 25.0));
    }
    sim.add_behavior(commander, Box::new(TakeCommand::new()));
    sim.add_behavior(commander, Box::new(PatrolSpeed::new()));
    sim.add_behavior(commander, Box::new(DetectEnemy::new()));
    sim.add_behavior(
        commander,
        Box::new(Communicate::relay(Source::Variable(TEAM_COMM.into()), ENEMY)),
    );

    for (i, x) in [-4.0, 3.0, 6.0].into_iter().enumerate() {
        let id = sim.spawn_agent(format!("Rifleman {}", i + 1), ReferenceFrame::from_yaw_degrees(Vec3::new(x, 0.0, -5.0), 0.0));
        sim.set_team(id, Some("blue"));
        if let Some(agent) = sim.agent_mut(id) {
            agent.memory.set(COMMANDER, commander);
        }
        sim.add_behavior(id, Box::new(FormationFollow::new(follow_strategy)));
        sim.add_behavior(id, Box::new(PatrolSpeed::new()));
    }

    for i in 0..2 {
        let id = sim.spawn_agent(
            format!("Assault {}", i + 1),
            ReferenceFrame::from_yaw_degrees(Vec3::new(-8.0 + 16.0 * i as f32, 0.0, 0.0), 0.0),
        );
        // Learns about the enemy over the team channel
        sim.set_team(id, Some("blue"));
        sim.add_behavior(id, Box::new(AttackPosition::new(attack_strategy)));
        sim.add_behavior(id, Box::new(PatrolSpeed::new()));
    }

    let marksman = sim.spawn_agent("Marksman", ReferenceFrame::from_yaw_degrees(Vec3::new(0.0, 0.0, 10.0), 0.0));
    sim.set_team(marksman, Some("blue"));
    sim.add_behavior(marksman, Box::new(DetectEnemy::new()));
    sim.add_behavior(marksman, Box::new(FindCoverPoint::new().with_cover_variable(MOVE_TARGET)));
    sim.add_behavior(marksman, Box::new(CoverFaceDirection::new()));

    Roster { commander, enemy }
}

fn switch_formation(sim: &mut SquadSimulation, commander: EntityId, args: &Args) {
    let Some(set) = sim.world.harness_set_mut(commander) else {
        return;
    };
    if let Some(name) = &args.formation {
        set.set_active(name);
    }
    if let Some(mode) = &args.mode {
        set.set_formation_mode(mode);
    }
}

fn print_text(summary: &SquadSummary, sim: &SquadSimulation, enemy: EntityId, failures: usize) {
    println!("=== Squad state after {} ticks ===", summary.tick);
    for body in &summary.bodies {
        println!(
            "  {:<12} ({:>7.2}, {:>7.2})  heading {:>5.1}{}",
            body.name,
            body.position.x,
            body.position.z,
            body.yaw_degrees,
            if body.commander { "  [commander]" } else { "" }
        );
    }
    println!();
    for harness in &summary.harnesses {
        let taken = harness.slots.iter().filter(|s| s.occupant.is_some()).count();
        println!(
            "  {}/{} {:<10} {}/{} taken{}",
            harness.anchor,
            harness.name,
            harness.formation_mode.as_deref().unwrap_or("-"),
            taken,
            harness.capacity,
            if harness.enabled { "" } else { "  (inactive)" }
        );
        for slot in harness.slots.iter().filter(|s| s.occupant.is_some()) {
            println!(
                "      slot {:>2} -> {}",
                slot.slot,
                slot.occupant.as_deref().unwrap_or("")
            );
        }
    }
    if let Some(position) = sim.world.position_of(enemy) {
        println!();
        println!("  Enemy at ({:.1}, {:.1})", position.x, position.z);
    }
    println!("  Behavior failures: {}", failures);
}
